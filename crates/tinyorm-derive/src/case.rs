//! Identifier case conversion.

/// Convert a camel/Pascal-case identifier into snake_case.
///
/// The rule is deliberately simple: insert `_` before every uppercase letter
/// that is not the first character, lowercase it, and leave everything else
/// untouched. `FirstName` becomes `first_name`; an uppercase run is split
/// letter by letter, so `ID` becomes `i_d`.
pub fn underscore_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
