//! Helper macros


/// Count the number of comma separated expressions
///
/// The expressions are never evaluated, only counted, so the result is usable as a constant.
// mutliple version to limit recusion
#[macro_export]
macro_rules! count_exprs {
    ($_a:expr, $_b:expr, $_c:expr, $_d:expr, $_e:expr,
     $_f:expr, $_g:expr, $_h:expr, $_i:expr, $_j:expr,
     $($rest:expr),+ $(,)?) => {
        10usize + $crate::count_exprs!($($rest),+)
    };
    ($_a:expr, $_b:expr, $_c:expr, $_d:expr, $_e:expr,
     $($rest:expr),+ $(,)?) => {
        5usize + $crate::count_exprs!($($rest),+)
    };
    ($_first:expr, $($rest:expr),+ $(,)?) => {
        1usize + $crate::count_exprs!($($rest),+)
    };
    ($_first:expr $(,)?) => {
        1usize
    };
    () => {
        0usize
    };
}

/// Get the name of the surrounding function
///
/// When used inside a closure, the name of the function that defines the closure is returned.
#[macro_export]
macro_rules! func_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let mut name = type_name_of(f);
        name = match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        };
        while let Some(stripped) = name.strip_suffix("::{{closure}}") {
            name = stripped;
        }
        name
    }};
}
