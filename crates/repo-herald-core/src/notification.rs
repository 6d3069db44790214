//! # Notification Classification Module
//!
//! Maps a parsed webhook payload plus a repository route to a concrete
//! notification intent, or to "no notification" for event shapes the relay
//! does not announce.
//!
//! The dispatch is exhaustive over (action, entity) pairs:
//!
//! | Action            | Entity       | Result                                  |
//! |-------------------|--------------|-----------------------------------------|
//! | opened / reopened | issue        | channel text                            |
//! | opened / reopened | pull request | channel text                            |
//! | closed            | issue        | channel text                            |
//! | closed            | pull request | channel text                            |
//! | created           | release      | forum post, or channel text if no forum |
//! | anything else     | —            | none                                    |
//!
//! "created" is only meaningful for releases. Issues and pull requests use
//! "opened"; a "created" action paired with an issue or pull request entity
//! is deliberately ignored rather than treated as an error.

use crate::event::{EventAction, EventEntity, ReleaseDetails, WebhookPayload};
use crate::routing::RepoRoute;
use crate::{ChannelId, ForumId};

// ============================================================================
// Core Types
// ============================================================================

/// The classifier's output: what to say and where to say it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationIntent {
    /// Post a plain text message to a channel
    ChannelMessage { channel: ChannelId, text: String },

    /// Create a discussion thread in a forum with an opening message
    ForumPost {
        forum: ForumId,
        title: String,
        body: String,
    },
}

impl NotificationIntent {
    /// Get the target identifier for logging
    pub fn target(&self) -> &str {
        match self {
            Self::ChannelMessage { channel, .. } => channel.as_str(),
            Self::ForumPost { forum, .. } => forum.as_str(),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a webhook payload into a notification intent
///
/// Returns `None` for actions or entities the relay does not announce;
/// that is a normal outcome, not an error, and the caller still reports
/// success to the webhook sender.
pub fn classify(payload: &WebhookPayload, route: &RepoRoute) -> Option<NotificationIntent> {
    let repo = payload.repository().short_name();

    match (payload.action(), payload.entity()) {
        (EventAction::Opened, EventEntity::Issue(issue)) => Some(channel_text(
            route,
            format!(
                "New issue opened in {}\n**{}** by {}\n{}",
                repo, issue.title, issue.author, issue.url
            ),
        )),
        (EventAction::Reopened, EventEntity::Issue(issue)) => Some(channel_text(
            route,
            format!(
                "Issue reopened in {}\n**{}** by {}\n{}",
                repo, issue.title, issue.author, issue.url
            ),
        )),
        (EventAction::Closed, EventEntity::Issue(issue)) => Some(channel_text(
            route,
            format!(
                "Issue closed in {}\n**{}** by {}\n{}",
                repo, issue.title, issue.author, issue.url
            ),
        )),
        (EventAction::Opened, EventEntity::PullRequest(pull)) => Some(channel_text(
            route,
            format!(
                "New Pull Request in {}\n**{}** by {}\n{}",
                repo, pull.title, pull.author, pull.url
            ),
        )),
        (EventAction::Reopened, EventEntity::PullRequest(pull)) => Some(channel_text(
            route,
            format!(
                "Reopened Pull Request in {}\n**{}** by {}\n{}",
                repo, pull.title, pull.author, pull.url
            ),
        )),
        (EventAction::Closed, EventEntity::PullRequest(pull)) => Some(channel_text(
            route,
            format!(
                "Pull Request closed in {}\n**{}** by {}\n{}",
                repo, pull.title, pull.author, pull.url
            ),
        )),
        (EventAction::Created, EventEntity::Release(release)) => {
            Some(release_intent(route, repo, release))
        }
        _ => None,
    }
}

/// Build the release notification
///
/// Releases go to the repository's forum when one is configured: the
/// thread title is the release tag, verbatim, and the thread body carries
/// the release notes. Without a forum the release is announced in the
/// plain channel like any other event.
fn release_intent(route: &RepoRoute, repo: &str, release: &ReleaseDetails) -> NotificationIntent {
    match route.forum() {
        Some(forum) => {
            let mut body = String::new();
            if !release.body.is_empty() {
                body.push_str(&release.body);
                body.push_str("\n\n");
            }
            body.push_str(&format!("Released by {}\n{}", release.author, release.url));

            NotificationIntent::ForumPost {
                forum: forum.clone(),
                title: release.tag.clone(),
                body,
            }
        }
        None => channel_text(
            route,
            format!(
                "Release {} created in {}\nby {}\n{}",
                release.tag, repo, release.author, release.url
            ),
        ),
    }
}

fn channel_text(route: &RepoRoute, text: String) -> NotificationIntent {
    NotificationIntent::ChannelMessage {
        channel: route.channel().clone(),
        text,
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
