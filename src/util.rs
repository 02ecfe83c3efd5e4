/*!

  Utils for gate-net development.

*/

/// Formats an [crate::port::Identifier] like `format!`
#[macro_export]
macro_rules! format_id {
    ($($arg:tt)*) => {
        $crate::port::Identifier::new(format!($($arg)*))
    };
}

/// Compare circuit dumps as strings up to indentation.
#[macro_export]
macro_rules! assert_dump_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_lines: Vec<&str> = left_val.lines().map(str::trim).collect();
                let right_lines: Vec<&str> = right_val.lines().map(str::trim).collect();
                assert_eq!(left_lines, right_lines);
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let left_lines: Vec<&str> = left_val.lines().map(str::trim).collect();
                let right_lines: Vec<&str> = right_val.lines().map(str::trim).collect();
                assert_eq!(left_lines, right_lines, std::format_args!($($arg)+));
            }
        }
    };
}
