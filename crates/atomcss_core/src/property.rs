/// Convert an authored property name into its kebab-case CSS form.
///
/// `backgroundColor` → `background-color`, `WebkitLineClamp` →
/// `-webkit-line-clamp`, `msFlex` → `-ms-flex`. Custom properties (`--x`) and
/// names that are already kebab-case are kept. Returns `None` for names that
/// are not valid CSS property identifiers.
pub fn normalize_property_name(name: &str) -> Option<String> {
  if let Some(custom) = name.strip_prefix("--") {
    let valid = !custom.is_empty()
      && custom
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    return valid.then(|| name.to_string());
  }

  let mut hyphenated = String::with_capacity(name.len() + 4);
  for ch in name.chars() {
    if ch.is_ascii_uppercase() {
      hyphenated.push('-');
      hyphenated.push(ch.to_ascii_lowercase());
    } else {
      hyphenated.push(ch);
    }
  }

  if hyphenated.starts_with("ms-") {
    hyphenated.insert(0, '-');
  }

  is_property_identifier(&hyphenated).then_some(hyphenated)
}

/// Whether `name` is already in normalized form.
pub fn is_normalized_property_name(name: &str) -> bool {
  normalize_property_name(name).as_deref() == Some(name)
}

fn is_property_identifier(name: &str) -> bool {
  let body = name.strip_prefix('-').unwrap_or(name);
  if body.ends_with('-') || body.contains("--") {
    return false;
  }

  let mut chars = body.chars();
  match chars.next() {
    Some(first) if first.is_ascii_lowercase() => {
      chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
    }
    _ => false,
  }
}
