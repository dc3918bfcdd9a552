//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format breadcrumb trails and type names
//! in error output.

/// Renders a resolution breadcrumb trail as a readable prefix.
///
/// Each enclosing type on the path from the resolution root to the
/// failing field contributes one bracketed segment.
///
/// # Examples
/// ```
/// use rabt_support::rendering::render_trail;
///
/// let trail = vec!["Outer", "Middle"];
/// assert_eq!(render_trail(&trail), "[Outer] [Middle]");
/// ```
pub fn render_trail(trail: &[impl AsRef<str>]) -> String {
    trail
        .iter()
        .map(|s| format!("[{}]", s.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use rabt_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::rc::Rc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Rc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    // Strategy: take the last segment of each path component
    // "my_app::services::UserService" → "UserService"
    // "Rc<dyn my_app::Logger>" → "Rc<dyn Logger>"

    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next(); // consume second ':'
                current_segment.clear(); // discard path prefix
            }
            '<' | '>' | ',' | ' ' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => {
                current_segment.push(ch);
            }
        }
    }

    result.push_str(&current_segment);
    result
}
