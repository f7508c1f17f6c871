//! Optimistic sync client
//!
//! Every mutation is applied to the local snapshot first and the snapshot is swapped
//! synchronously; the matching request is then queued for a background worker that
//! pushes requests one at a time, in the order they were queued. A failed push is
//! logged and published as an event. The local snapshot is never rolled back, so
//! after a failure the client and the store may disagree.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::client::error::{SyncError, TransportError};
use crate::client::transport::TreeTransport;
use crate::models::{NodePatch, TreeDocument, TreeNode, ROOT_NAME};
use crate::operations::{self, AddChildOutcome, ChildSpec, MutationError};

/// Capacity of the sync event channel
pub const SYNC_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Which request a push carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOperation {
    AddChild {
        parent_name: String,
        child_name: String,
    },
    ReplaceTree {
        root_name: String,
    },
}

/// Outcome of one background push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Pushed { operation: PushOperation },
    PushFailed {
        operation: PushOperation,
        message: String,
    },
}

/// A queued request with its payload
enum PushRequest {
    AddChild { parent_name: String, child: TreeNode },
    ReplaceTree { tree: Arc<TreeNode> },
}

impl PushRequest {
    fn operation(&self) -> PushOperation {
        match self {
            PushRequest::AddChild { parent_name, child } => PushOperation::AddChild {
                parent_name: parent_name.clone(),
                child_name: child.name.clone(),
            },
            PushRequest::ReplaceTree { tree } => PushOperation::ReplaceTree {
                root_name: tree.name.clone(),
            },
        }
    }

    async fn send(&self, transport: &dyn TreeTransport) -> Result<(), TransportError> {
        match self {
            PushRequest::AddChild { parent_name, child } => {
                transport.add_child(parent_name, child).await
            }
            PushRequest::ReplaceTree { tree } => transport.replace_tree(tree).await,
        }
    }
}

/// Session-side owner of the tree
///
/// Dropping the client closes the push queue; requests already queued are still sent.
pub struct SyncClient {
    tree: RwLock<Arc<TreeNode>>,
    push_tx: mpsc::UnboundedSender<PushRequest>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl SyncClient {
    /// Client starting from `tree`.
    ///
    /// Spawns the push worker, so this must be called inside a Tokio runtime.
    pub fn new(tree: TreeNode, transport: Arc<dyn TreeTransport>) -> Self {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(SYNC_EVENT_CHANNEL_CAPACITY);

        tokio::spawn(run_push_worker(transport, push_rx, event_tx.clone()));

        Self {
            tree: RwLock::new(Arc::new(tree)),
            push_tx,
            event_tx,
        }
    }

    /// Fetch the stored trees and start from the one named `root`.
    ///
    /// Falls back to the first document, and to a fresh root when the server has
    /// nothing or answers 404.
    ///
    /// # Errors
    ///
    /// Any other transport failure.
    pub async fn load(transport: Arc<dyn TreeTransport>) -> Result<Self, SyncError> {
        let tree = match transport.fetch_trees().await {
            Ok(documents) => select_tree(documents),
            Err(e) if e.is_not_found() => {
                info!("Server has no tree yet, starting from an empty root");
                TreeNode::root()
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded tree '{}' with {} node(s)", tree.name, tree.node_count());
        Ok(Self::new(tree, transport))
    }

    /// Current snapshot. Later mutations produce new snapshots and never change this one.
    pub fn snapshot(&self) -> Arc<TreeNode> {
        let current = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// Add a generated child under `parent_name` and queue the matching POST.
    ///
    /// # Errors
    ///
    /// `MutationError::ParentNotFound` if no node has that name; nothing is queued.
    pub fn add_child(&self, parent_name: &str) -> Result<TreeNode, SyncError> {
        let mut current = self.write_tree();
        let AddChildOutcome { tree, child } =
            operations::add_child(&current, parent_name, ChildSpec::Generated)?;

        *current = Arc::new(tree);
        self.queue(PushRequest::AddChild {
            parent_name: parent_name.to_string(),
            child: child.clone(),
        });

        debug!("Added '{}' under '{}'", child.name, parent_name);
        Ok(child)
    }

    /// Apply `patch` to the node named `target` and queue a PUT of the whole tree.
    ///
    /// An unknown `target` changes nothing and returns `Ok`.
    ///
    /// # Errors
    ///
    /// `MutationError::NameTaken` if the patch renames onto a name already in the
    /// tree; nothing is applied or queued.
    pub fn update_node(&self, target: &str, patch: &NodePatch) -> Result<(), SyncError> {
        let mut current = self.write_tree();
        match operations::update_node(&current, target, patch) {
            Ok(tree) => {
                let tree = Arc::new(tree);
                *current = Arc::clone(&tree);
                self.queue(PushRequest::ReplaceTree { tree });
                Ok(())
            }
            Err(MutationError::NodeNotFound { .. }) => {
                debug!("Update ignored, no node named '{}'", target);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Pretty-printed JSON of the current tree; also queues a PUT of it.
    pub fn export(&self) -> Result<String, SyncError> {
        let tree = self.snapshot();
        let exported = serde_json::to_string_pretty(tree.as_ref())?;
        self.queue(PushRequest::ReplaceTree { tree });
        Ok(exported)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, Arc<TreeNode>> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue(&self, request: PushRequest) {
        if self.push_tx.send(request).is_err() {
            warn!("Push worker has stopped, change kept locally only");
        }
    }
}

/// The `root` document, else the first one, else a fresh root
fn select_tree(documents: Vec<TreeDocument>) -> TreeNode {
    let mut trees: Vec<TreeNode> = documents.into_iter().map(TreeDocument::into_tree).collect();
    match trees.iter().position(|tree| tree.name == ROOT_NAME) {
        Some(index) => trees.swap_remove(index),
        None if !trees.is_empty() => trees.swap_remove(0),
        None => TreeNode::root(),
    }
}

async fn run_push_worker(
    transport: Arc<dyn TreeTransport>,
    mut push_rx: mpsc::UnboundedReceiver<PushRequest>,
    event_tx: broadcast::Sender<SyncEvent>,
) {
    while let Some(request) = push_rx.recv().await {
        let operation = request.operation();

        let event = match request.send(transport.as_ref()).await {
            Ok(()) => {
                debug!("Pushed {:?}", operation);
                SyncEvent::Pushed { operation }
            }
            Err(e) => {
                warn!("Push failed for {:?}: {}", operation, e);
                SyncEvent::PushFailed {
                    operation,
                    message: e.to_string(),
                }
            }
        };

        // No subscribers is fine
        let _ = event_tx.send(event);
    }

    debug!("Push queue closed");
}

#[cfg(test)]
#[path = "sync_client_test.rs"]
mod sync_client_test;
