use crate::llm::ChatMessage;

use tracing::debug;

/// Keeps a conversation under `char_limit` characters.
///
/// Oldest non-system messages are dropped first while more than one
/// non-system message remains; if the conversation is still too large the
/// last message is truncated.
///
/// # Returns
/// * `bool` - True if messages were modified, False otherwise
pub fn fit_conversation(messages: &mut Vec<ChatMessage>, char_limit: usize) -> bool {
    let mut total: usize = messages.iter().map(|msg| msg.content.chars().count()).sum();
    if total <= char_limit {
        return false;
    }

    while total > char_limit && messages.iter().filter(|m| m.role != "system").count() > 1 {
        let Some(idx) = messages.iter().position(|m| m.role != "system") else {
            break;
        };
        let removed = messages.remove(idx);
        total -= removed.content.chars().count();
        debug!(
            "Removed old message to reduce conversation size. Remaining messages: {}",
            messages.len()
        );
    }

    if total > char_limit {
        let overflow = total - char_limit;
        if let Some(last_msg) = messages.last_mut() {
            let keep = last_msg.content.chars().count().saturating_sub(overflow);
            last_msg.content = truncate_chars(&last_msg.content, keep);
            debug!("Truncated last message to fit the conversation limit");
        }
    }
    true
}

/// Returns at most `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Extracts the body of the first fenced code block, preferring a
/// ```` ```<lang> ```` fence when one is present. Text without fences is
/// returned trimmed.
pub fn extract_code_block(text: &str, lang: &str) -> String {
    let tagged = format!("```{}", lang);
    let body = if let Some(start) = text.find(&tagged) {
        &text[start + tagged.len()..]
    } else if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        // skip an unknown language tag on the opening line
        match rest.find('\n') {
            Some(nl) if !rest[..nl].trim().contains(' ') => &rest[nl + 1..],
            _ => rest,
        }
    } else {
        return text.trim().to_string();
    };

    match body.find("```") {
        Some(end) => body[..end].trim().to_string(),
        None => body.trim().to_string(),
    }
}

/// Removes a markdown fence wrapping the whole response, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```")) || trimmed.len() < 6 {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    match inner.find('\n') {
        Some(nl) => inner[nl + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_conversation_is_untouched() {
        let mut messages = vec![ChatMessage::system("rules"), ChatMessage::user("hi")];
        assert!(!fit_conversation(&mut messages, 100));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn drops_oldest_then_truncates() {
        let mut messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user(&"a".repeat(50)),
            ChatMessage::user(&"b".repeat(50)),
        ];
        assert!(fit_conversation(&mut messages, 33));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "b".repeat(30));
    }

    #[test]
    fn extracts_tagged_and_bare_blocks() {
        let tagged = "Here:\n```python\nprint('x')\n```\nDone";
        assert_eq!(extract_code_block(tagged, "python"), "print('x')");

        let bare = "```rust\nfn main() {}\n```";
        assert_eq!(extract_code_block(bare, "python"), "fn main() {}");

        assert_eq!(extract_code_block("  plain code  ", "python"), "plain code");
    }

    #[test]
    fn strips_wrapping_fence_only() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("  [1]  "), "[1]");
        assert_eq!(strip_code_fence("text ```x``` text"), "text ```x``` text");
    }
}
