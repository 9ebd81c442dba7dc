/// Creates a `String` from any value that implements `ToString`.
///
/// # Examples
/// ```
/// use crossbox_utils::string;
///
/// let s = string!("amd64");
/// assert_eq!(s, String::from("amd64"));
/// ```
#[macro_export]
macro_rules! string {
    ($str:expr) => {
        ::std::string::ToString::to_string(&$str)
    };
}

/// Creates a `Vec<String>` from a list of values that
/// implement `ToString`.
///
/// # Examples
/// ```
/// use crossbox_utils::string_vec;
///
/// let name = "app";
/// let v = string_vec!["fyne", "package", "-name", name];
/// assert_eq!(v, vec!["fyne", "package", "-name", "app"]);
/// ```
#[macro_export]
macro_rules! string_vec {
    ($($string:expr),* $(,)?) => {
        {
            vec![
                $($crate::string!($string),)*
            ]
        }
    };
}
