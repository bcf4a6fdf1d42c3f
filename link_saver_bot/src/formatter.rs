use std::fmt::Write;

use bot_commons::{useful_methods::JoinUnderLength, TELEGRAM_MESSAGE_LIMIT};
use html_escape::encode_text;

use crate::types::{Link, Tag, TagSet};

pub const NO_LINKS: &str = "You haven't saved any links yet.";
pub const NO_TAGS: &str = "You haven't used any tags yet.";

/// Append tags as `#tag #tag` to the output, with a leading space for each.
fn push_tags<'a>(output: &mut String, tags: impl IntoIterator<Item = &'a Tag>) {
    for tag in tags {
        write!(output, " #{}", encode_text(tag.as_str())).expect("Writing to a String never fails");
    }
}

/// One line of a listing: the URL followed by its tags.
#[must_use]
pub fn render_link(link: &Link) -> String {
    let mut line = format!("• {}", encode_text(&link.url));
    push_tags(&mut line, &link.tags);
    line
}

/// Render a listing of links under a header into message-sized chunks.
///
/// Links are never split between chunks, and their order is kept.
/// An empty listing is a single chunk with `if_empty` in it.
#[must_use]
pub fn format_links(header: &str, links: &[Link], if_empty: &str) -> Vec<String> {
    format_links_with_limit(header, links, if_empty, TELEGRAM_MESSAGE_LIMIT)
}

fn format_links_with_limit(
    header: &str,
    links: &[Link],
    if_empty: &str,
    max_len: usize,
) -> Vec<String> {
    if links.is_empty() {
        return vec![if_empty.to_string()];
    }

    // Header gets an empty line after it.
    let header = format!("{header}\n");
    let lines = std::iter::once(header).chain(links.iter().map(render_link));

    JoinUnderLength::new(lines, "\n", max_len).collect()
}

/// Text for `/tags`, split into message-sized chunks between tags.
#[must_use]
pub fn format_tags(tags: &TagSet) -> Vec<String> {
    format_tags_with_limit(tags, TELEGRAM_MESSAGE_LIMIT)
}

fn format_tags_with_limit(tags: &TagSet, max_len: usize) -> Vec<String> {
    let mut rendered = tags
        .iter()
        .map(|tag| format!("#{}", encode_text(tag.as_str())));

    // The header goes on its own line, glued to the first tag.
    let Some(first) = rendered.next() else {
        return vec![NO_TAGS.to_string()];
    };
    let pieces = std::iter::once(format!("Your tags:\n{first}")).chain(rendered);

    JoinUnderLength::new(pieces, " ", max_len).collect()
}

/// Confirmation reply for a freshly saved link.
#[must_use]
pub fn format_saved(link: &Link) -> String {
    let mut response = format!("Link saved: {}\n", encode_text(&link.url));
    if link.tags.is_empty() {
        response.push_str("No tags.");
    } else {
        response.push_str("Tags:");
        push_tags(&mut response, &link.tags);
    }
    response
}

#[cfg(test)]
mod tests {
    use bot_commons::useful_methods::telegram_len;
    use chrono::Utc;
    use teloxide::types::UserId;

    use super::*;

    fn link(id: i64, url: &str, tags: &[&str]) -> Link {
        Link {
            id,
            owner: UserId(1),
            url: url.to_string(),
            tags: tags.iter().filter_map(|tag| Tag::new(tag)).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn link_rendering() {
        assert_eq!(
            render_link(&link(1, "https://example.com", &["tech", "article"])),
            "• https://example.com #article #tech"
        );
        assert_eq!(render_link(&link(1, "a&b<c>", &[])), "• a&amp;b&lt;c&gt;");
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_links("Your saved links:", &[], NO_LINKS), [NO_LINKS]);
    }

    #[test]
    fn short_listing_is_one_chunk() {
        let links = [link(1, "a.example", &["x"]), link(2, "b.example", &[])];
        assert_eq!(
            format_links("Your saved links:", &links, NO_LINKS),
            ["Your saved links:\n\n• a.example #x\n• b.example"]
        );
    }

    #[test]
    fn long_listing_is_split_between_links() {
        let links: Vec<Link> = (0..300)
            .map(|i| link(i, &format!("https://example.com/some/long/path/{i}"), &["tech"]))
            .collect();
        let rendered: Vec<String> = links.iter().map(render_link).collect();

        let chunks = format_links("Your saved links:", &links, NO_LINKS);
        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("Your saved links:\n\n"));

        let mut lines = Vec::new();
        for chunk in &chunks {
            assert!(telegram_len(chunk) <= TELEGRAM_MESSAGE_LIMIT);
            lines.extend(chunk.lines().filter(|line| line.starts_with('•')));
        }
        // Every link is present exactly once, whole, in order.
        assert_eq!(lines, rendered);
    }

    #[test]
    fn chunks_fill_up_to_the_limit() {
        let links = [
            link(1, "aaaa", &[]),
            link(2, "bbbb", &[]),
            link(3, "cccc", &[]),
        ];
        // Each rendered link is 6 characters long, header is "H\n".
        let chunks = format_links_with_limit("H", &links, NO_LINKS, 16);
        assert_eq!(chunks, ["H\n\n• aaaa\n• bbbb", "• cccc"]);
    }

    #[test]
    fn oversized_link_is_sent_whole() {
        let links = [link(1, "a", &[]), link(2, &"x".repeat(50), &[]), link(3, "b", &[])];
        let chunks = format_links_with_limit("H", &links, NO_LINKS, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], format!("• {}", "x".repeat(50)));
    }

    #[test]
    fn tags_rendering() {
        assert_eq!(format_tags(&TagSet::new()), [NO_TAGS]);
        let tags: TagSet = ["tech", "cats", "article"]
            .iter()
            .filter_map(|tag| Tag::new(tag))
            .collect();
        assert_eq!(format_tags(&tags), ["Your tags:\n#article #cats #tech"]);
    }

    #[test]
    fn many_tags_are_split_between_tags() {
        let tags: TagSet = (0..600)
            .filter_map(|i| Tag::new(&format!("tag{i:05}")))
            .collect();

        let chunks = format_tags(&tags);
        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("Your tags:\n#tag00000 "));

        let mut seen = Vec::new();
        for chunk in &chunks {
            assert!(telegram_len(chunk) <= TELEGRAM_MESSAGE_LIMIT);
            seen.extend(chunk.split_whitespace().filter(|word| word.starts_with('#')));
        }
        let expected: Vec<String> = tags.iter().map(|tag| format!("#{tag}")).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn tags_fill_up_to_the_limit() {
        let tags: TagSet = ["aa", "bb", "cc"]
            .iter()
            .filter_map(|tag| Tag::new(tag))
            .collect();
        // "Your tags:\n#aa" is 14 long, every other tag is 3 plus a space.
        assert_eq!(
            format_tags_with_limit(&tags, 18),
            ["Your tags:\n#aa #bb", "#cc"]
        );
    }

    #[test]
    fn saved_rendering() {
        assert_eq!(
            format_saved(&link(1, "x.example", &["b", "a"])),
            "Link saved: x.example\nTags: #a #b"
        );
        assert_eq!(
            format_saved(&link(1, "x.example", &[])),
            "Link saved: x.example\nNo tags."
        );
    }
}
