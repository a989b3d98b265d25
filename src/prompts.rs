pub const STORY_SYSTEM: &str = include_str!("../data/prompts/story_system.txt");
pub const STORY_USER: &str = include_str!("../data/prompts/story_user.txt");
pub const STORY_USER_TITLED: &str = include_str!("../data/prompts/story_user_titled.txt");
pub const IMAGE_STYLE: &str = include_str!("../data/prompts/image_style.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// The template is scanned once, so substituted values are never re-expanded.
/// Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

/// User message for the story model, naming the song when a title is known.
pub fn story_user_message(lyrics: &str, title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => render(STORY_USER_TITLED, &[("title", title), ("lyrics", lyrics)]),
        None => render(STORY_USER, &[("lyrics", lyrics)]),
    }
}
