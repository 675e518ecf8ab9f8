//! Live feed of new posts.
//!
//! Delivery is best effort: nothing is persisted or replayed, and a
//! subscriber that falls behind by more than the channel capacity skips the
//! posts it missed.

use api_types::post::PostView;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct FeedRelay {
    sender: broadcast::Sender<PostView>,
}

impl FeedRelay {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fans `post` out to every open subscription and returns how many
    /// received it.
    pub fn publish(&self, post: PostView) -> usize {
        self.sender.send(post).unwrap_or(0)
    }

    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<PostView> {
        self.sender.subscribe()
    }
}
