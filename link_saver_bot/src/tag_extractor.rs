use crate::{
    error::CommandError,
    types::{Tag, TagSet},
};

/// Parse the parameters of a `/save` command into a URL and its tags.
///
/// The first whitespace separated word not starting with `#` is the URL,
/// taken verbatim. Every word starting with `#` is a tag. Anything else
/// is free text and is ignored.
///
/// # Errors
/// Returns [`CommandError::MissingUrl`] if there is no word to use as the URL.
pub fn extract_link_and_tags(params: &str) -> Result<(String, TagSet), CommandError> {
    let mut url = None;
    let mut tags = TagSet::new();

    for word in params.split_whitespace() {
        if word.starts_with('#') {
            // Bare "#" gives no tag and is dropped.
            if let Some(tag) = Tag::new(word) {
                tags.insert(tag);
            }
        } else if url.is_none() {
            url = Some(word);
        }
    }

    let url = url.ok_or(CommandError::MissingUrl)?;
    Ok((url.to_string(), tags))
}
