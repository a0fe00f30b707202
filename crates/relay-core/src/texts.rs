//! User- and admin-facing message texts.

use crate::domain::{ChatId, UserProfile};

pub const SUPPORT_REPLY_LABEL: &str = "📨 Reply from support:";
pub const USER_MESSAGE_LABEL: &str = "👤 User:";

pub const REPLY_BUTTON_LABEL: &str = "📝 Reply";
pub const REPLY_BUTTON_DATA: &str = "reply_to_admin";
pub const REPLY_PROMPT: &str = "📝 Write your reply. It will be passed to the support team.";

pub const NOT_CONFIGURED: &str = "⏳ The support group is not configured yet. \
Administrators must add the bot to a group and run /setgroup there.";
pub const FIRST_CONTACT_OK: &str =
    "✅ Your message has been sent to the support team. Wait for an answer here.";
pub const CREATION_FAILED: &str = "❌ Failed to open a support request. Please try again later.";
pub const DELIVERY_FAILED: &str = "❌ Failed to send your message.";
pub const PHOTO_SENT: &str = "✅ Photo sent to the support team.";
pub const FILE_SENT: &str = "✅ File sent to the support team.";
pub const INTERNAL_ERROR: &str = "❌ Something went wrong. Please try again later.";

pub const STATUS_OPEN: &str =
    "✅ You have an active request. The support team already sees your messages.";
pub const STATUS_NONE: &str =
    "❌ You have no active requests. Send any message to open one.";

pub const CANCEL_CLOSED: &str =
    "✅ Your request has been closed. If you have more questions, just write again!";
pub const CANCEL_TOPIC_LEFT_OPEN: &str =
    "✅ Request cancelled (the topic in the support group stays open).";
pub const CANCEL_NOTHING: &str = "❌ You have no active requests.";

pub const REPLY_DELIVERED: &str = "✅ Reply sent to the user.";
pub const UNKNOWN_TOPIC: &str = "❌ Cannot find the user for this topic.";

pub const SETGROUP_WRONG_CONTEXT: &str = "❌ This command must be used in a group!";
pub const SETGROUP_UNAUTHORIZED: &str = "❌ Only administrators can use this command!";
pub const SETGROUP_CHECK_FAILED: &str = "❌ Failed to check administrator rights.";

pub fn welcome(first_name: &str) -> String {
    format!(
        "👋 Hi, {first_name}!\n\n\
I am a relay bot. Everything you send me is passed anonymously to the support team.\n\n\
📌 Rules:\n\
1. Write your questions or messages and I will pass them on\n\
2. Answers from support will arrive here\n\
3. Do not spam, it may get you blocked\n\n\
Just write your message and I will deliver it!"
    )
}

pub const USER_HELP: &str = "🤖 Bot help:\n\n\
I pass your messages to the support team anonymously. Just write me anything and I will deliver it.\n\n\
📝 Commands:\n\
/start - Start the conversation\n\
/help - This help\n\
/status - Status of your request\n\
/cancel - Cancel your current request\n\n\
⏰ Response time: usually within 24 hours";

pub const ADMIN_HELP: &str = "🛠 Administrator commands:\n\n\
/setgroup - Make the current group the support group (run inside the group)\n\
/adminhelp - This help\n\n\
📌 How it works:\n\
1. A user writes to the bot in private\n\
2. The bot creates a topic for that user in this group\n\
3. You answer in the topic (reply to the bot's message)\n\
4. The bot forwards your answer to the user";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see what I can do.";

pub fn group_bound(chat_id: ChatId, title: Option<&str>) -> String {
    format!(
        "✅ This group is now the support group!\n\
ID: {chat_id}\n\
Title: {}\n\n\
From now on the bot creates a topic here for every new user.",
        title.unwrap_or("-")
    )
}

/// First message posted into a freshly created topic.
pub fn introduction(user: &UserProfile, timestamp: &str, first_text: Option<&str>) -> String {
    let mut out = format!(
        "📨 New request!\n\n\
User ID: {}\n\
Name: {}\n\
Time: {timestamp}",
        user.id, user.first_name
    );
    if let Some(u) = user.username.as_deref().filter(|u| !u.trim().is_empty()) {
        out.push_str(&format!("\nUsername: @{u}"));
    }
    if let Some(t) = first_text.filter(|t| !t.trim().is_empty()) {
        out.push_str(&format!("\n\nFirst message:\n{t}"));
    }
    out
}

/// Text forwarded into an existing topic.
pub fn user_text(text: &str) -> String {
    format!("{USER_MESSAGE_LABEL}\n{text}")
}

/// Caption for media forwarded into an existing topic.
pub fn user_caption(caption: Option<&str>) -> Option<String> {
    caption.map(|c| format!("{USER_MESSAGE_LABEL} {c}"))
}

/// Support reply as the end-user sees it.
pub fn support_reply(text: &str) -> String {
    format!("{SUPPORT_REPLY_LABEL}\n\n{text}")
}

pub fn support_caption(caption: Option<&str>) -> String {
    match caption {
        Some(c) => format!("{SUPPORT_REPLY_LABEL}\n\n{c}"),
        None => SUPPORT_REPLY_LABEL.to_string(),
    }
}

pub fn reply_failed(error: &str) -> String {
    format!("❌ Error: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn introduction_lists_identity_and_first_text() {
        let user = UserProfile {
            id: UserId(42),
            first_name: "Ann".to_string(),
            username: Some("ann".to_string()),
        };
        let intro = introduction(&user, "2026-01-02 03:04:05", Some("hello"));
        assert!(intro.contains("User ID: 42"));
        assert!(intro.contains("Name: Ann"));
        assert!(intro.contains("Time: 2026-01-02 03:04:05"));
        assert!(intro.contains("Username: @ann"));
        assert!(intro.ends_with("First message:\nhello"));

        let bare = introduction(
            &UserProfile {
                username: None,
                ..user
            },
            "t",
            None,
        );
        assert!(!bare.contains("Username"));
        assert!(!bare.contains("First message"));
    }
}
