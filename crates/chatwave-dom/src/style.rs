//! Inline `style` attribute handling.
//!
//! Only declaration lists (`prop: value; prop: value`) are understood, which
//! is all the bridge needs to hide and show page chrome.

/// A single inline declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// Parse a `style` attribute into declarations. Later duplicates win.
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();

    for chunk in style.split(';') {
        let Some((property, value)) = chunk.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }

        out.retain(|d| d.property != property);
        out.push(Declaration {
            property,
            value: value.to_string(),
        });
    }

    out
}

/// Serialize declarations back into attribute form.
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|d| format!("{}: {};", d.property, d.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a property in a `style` attribute.
pub fn get_property(style: &str, property: &str) -> Option<String> {
    let property = property.to_ascii_lowercase();
    parse_declarations(style)
        .into_iter()
        .find(|d| d.property == property)
        .map(|d| d.value)
}

/// Return `style` with `property` set to `value`, or removed when `value` is empty.
pub fn set_property(style: &str, property: &str, value: &str) -> String {
    let property = property.to_ascii_lowercase();
    let mut declarations = parse_declarations(style);
    let value = value.trim();

    match declarations.iter_mut().find(|d| d.property == property) {
        Some(existing) if !value.is_empty() => existing.value = value.to_string(),
        Some(_) => declarations.retain(|d| d.property != property),
        None if !value.is_empty() => declarations.push(Declaration {
            property,
            value: value.to_string(),
        }),
        None => {}
    }

    serialize_declarations(&declarations)
}
