//! Request/completion dispatch.
//!
//! [`Command`] names every manager operation as data. The [`Dispatcher`]
//! runs commands on tokio tasks, at most `worker_pool_size` at a time, and
//! hands back a [`Completion`] that resolves exactly once with the result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use didvault_core::{DidWithMeta, Endpoint};
use didvault_ledger::Ledger;
use didvault_store::SecureStore;
use tokio::sync::{oneshot, Semaphore};

use crate::error::{Result, VaultError};
use crate::manager::DidManager;
use crate::peers::PeerIdentity;
use crate::registry::DidSpec;
use crate::rotation::KeySpec;

/// A manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateAndStoreMyDid(DidSpec),
    ReplaceKeysStart { did: String, spec: KeySpec },
    ReplaceKeysApply { did: String },
    StoreTheirDid(PeerIdentity),
    KeyForDid { did: String },
    KeyForLocalDid { did: String },
    SetEndpointForDid {
        did: String,
        address: String,
        transport_verkey: Option<String>,
    },
    GetEndpointForDid { did: String },
    SetDidMetadata { did: String, metadata: String },
    GetDidMetadata { did: String },
    GetMyDidWithMeta { did: String },
    ListMyDidsWithMeta,
    AbbreviateVerkey { did: String, verkey: String },
}

/// The successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    Created { did: String, verkey: String },
    Verkey(String),
    Endpoint(Endpoint),
    Metadata(Option<String>),
    Did(DidWithMeta),
    Dids(Vec<DidWithMeta>),
}

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    /// Run a command.
    pub async fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::CreateAndStoreMyDid(spec) => {
                let (did, verkey) = self.create_and_store_my_did(&spec).await?;
                Ok(Reply::Created {
                    did: did.into(),
                    verkey: verkey.into(),
                })
            }
            Command::ReplaceKeysStart { did, spec } => self
                .replace_keys_start(&did, &spec)
                .await
                .map(|verkey| Reply::Verkey(verkey.into())),
            Command::ReplaceKeysApply { did } => {
                self.replace_keys_apply(&did).await.map(|()| Reply::Done)
            }
            Command::StoreTheirDid(identity) => {
                self.store_their_did(&identity).await.map(|()| Reply::Done)
            }
            Command::KeyForDid { did } => self.key_for_did(&did).await.map(Reply::Verkey),
            Command::KeyForLocalDid { did } => {
                self.key_for_local_did(&did).await.map(Reply::Verkey)
            }
            Command::SetEndpointForDid {
                did,
                address,
                transport_verkey,
            } => self
                .set_endpoint_for_did(&did, &address, transport_verkey.as_deref())
                .await
                .map(|()| Reply::Done),
            Command::GetEndpointForDid { did } => {
                self.get_endpoint_for_did(&did).await.map(Reply::Endpoint)
            }
            Command::SetDidMetadata { did, metadata } => self
                .set_did_metadata(&did, &metadata)
                .await
                .map(|()| Reply::Done),
            Command::GetDidMetadata { did } => {
                self.get_did_metadata(&did).await.map(Reply::Metadata)
            }
            Command::GetMyDidWithMeta { did } => {
                self.get_my_did_with_meta(&did).await.map(Reply::Did)
            }
            Command::ListMyDidsWithMeta => self.list_my_dids_with_meta().await.map(Reply::Dids),
            Command::AbbreviateVerkey { did, verkey } => {
                self.abbreviate_verkey(&did, &verkey).map(Reply::Verkey)
            }
        }
    }
}

/// Runs commands on a bounded pool of tokio tasks.
pub struct Dispatcher<S, L> {
    manager: Arc<DidManager<S, L>>,
    permits: Arc<Semaphore>,
}

impl<S, L> Dispatcher<S, L>
where
    S: SecureStore + 'static,
    L: Ledger + 'static,
{
    /// Create a dispatcher sized by the manager's `worker_pool_size`.
    pub fn new(manager: Arc<DidManager<S, L>>) -> Self {
        let size = manager.config().worker_pool_size.max(1);
        Self {
            manager,
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    pub fn manager(&self) -> &Arc<DidManager<S, L>> {
        &self.manager
    }

    /// Queue a command. Must be called within a tokio runtime.
    pub fn submit(&self, command: Command) -> Completion {
        let (tx, rx) = oneshot::channel();
        let manager = Arc::clone(&self.manager);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => manager.execute(command).await,
                Err(_) => Err(VaultError::WorkerPoolClosed),
            };
            // The caller may have dropped its Completion.
            let _ = tx.send(result);
        });

        Completion { rx }
    }

    /// Submit a command and wait for its result.
    pub async fn call(&self, command: Command) -> Result<Reply> {
        self.submit(command).await
    }

    /// Stop accepting work. Queued commands fail with `WorkerPoolClosed`;
    /// running ones finish.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// The pending result of a submitted command.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Result<Reply>>,
}

impl Future for Completion {
    type Output = Result<Reply>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(VaultError::Cancelled)))
    }
}
