//! Offloaded chunk meshing
//!
//! The render loop must never stall on vertex generation, so chunk meshes
//! are built on a dedicated runtime and exchanged over channels using a
//! small serializable protocol. Requests carry a caller-chosen correlation
//! id; the caller matches results back by id and is free to ignore ones
//! that went stale while in flight.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::core::Error;
use crate::mesh::{ChunkMesh, MeshContext, build_chunk_mesh};

/// One chunk meshing job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRequest {
    /// Caller-chosen correlation id, echoed back in the result.
    pub id: String,
    pub x: i32,
    pub z: i32,
    pub level: u32,
}

/// Outcome of one meshing job, tagged for the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeshResult {
    /// The chunk produced geometry.
    Geometry {
        id: String,
        level: u32,
        #[serde(flatten)]
        mesh: ChunkMesh,
    },
    /// Every cell in the chunk was culled.
    Empty { id: String, level: u32 },
    /// The request was rejected before meshing.
    Failed { id: String, reason: String },
}

impl MeshResult {
    pub fn id(&self) -> &str {
        match self {
            Self::Geometry { id, .. } | Self::Empty { id, .. } | Self::Failed { id, .. } => id,
        }
    }
}

fn process_request(request: MeshRequest, ctx: &MeshContext) -> MeshResult {
    if request.level == 0
        || !request.level.is_power_of_two()
        || request.level > ctx.chunk_size
    {
        let reason = format!(
            "level must be a power of two in 1..={}, got {}",
            ctx.chunk_size, request.level
        );
        log::error!("rejecting mesh request {}: {}", request.id, reason);
        return MeshResult::Failed {
            id: request.id,
            reason,
        };
    }

    match build_chunk_mesh(request.x, request.z, request.level, ctx) {
        Some(mesh) => MeshResult::Geometry {
            id: request.id,
            level: request.level,
            mesh,
        },
        None => MeshResult::Empty {
            id: request.id,
            level: request.level,
        },
    }
}

/// Background chunk mesher with bounded concurrency
///
/// Owns a dedicated runtime; jobs run on blocking threads so noise
/// sampling never ties up the async driver. Results arrive in completion
/// order, not request order.
pub struct MeshWorker {
    _runtime: Runtime,
    request_tx: mpsc::UnboundedSender<MeshRequest>,
    result_rx: mpsc::UnboundedReceiver<MeshResult>,
    pending: HashSet<String>,
}

impl MeshWorker {
    pub fn new(ctx: MeshContext, max_concurrent: usize) -> Result<Self, Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| Error::Worker(format!("failed to build runtime: {e}")))?;

        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<MeshRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<MeshResult>();
        let ctx = Arc::new(ctx);
        let max_concurrent = max_concurrent.max(1);

        runtime.spawn(async move {
            let mut jobs: JoinSet<MeshResult> = JoinSet::new();
            loop {
                tokio::select! {
                    request = request_rx.recv() => {
                        let Some(request) = request else { break };
                        while jobs.len() >= max_concurrent {
                            match jobs.join_next().await {
                                Some(Ok(result)) => {
                                    let _ = result_tx.send(result);
                                }
                                Some(Err(e)) => log::error!("mesh job panicked: {e}"),
                                None => break,
                            }
                        }
                        let ctx = Arc::clone(&ctx);
                        jobs.spawn_blocking(move || process_request(request, &ctx));
                    }
                    Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                        match joined {
                            Ok(result) => {
                                let _ = result_tx.send(result);
                            }
                            Err(e) => log::error!("mesh job panicked: {e}"),
                        }
                    }
                }
            }
            // Requests closed; drain what is still running.
            while let Some(joined) = jobs.join_next().await {
                if let Ok(result) = joined {
                    let _ = result_tx.send(result);
                }
            }
        });

        Ok(Self {
            _runtime: runtime,
            request_tx,
            result_rx,
            pending: HashSet::new(),
        })
    }

    /// Queue one meshing job
    pub fn request(&mut self, request: MeshRequest) -> Result<(), Error> {
        self.pending.insert(request.id.clone());
        self.request_tx
            .send(request)
            .map_err(|e| Error::Worker(format!("mesh worker is gone: {e}")))
    }

    /// Drain all results that have arrived, without blocking
    ///
    /// Results whose id is no longer pending (cancelled, or superseded by
    /// a newer request for the same chunk) are dropped here.
    pub fn poll_results(&mut self) -> Vec<MeshResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            if self.pending.remove(result.id()) {
                results.push(result);
            } else {
                log::debug!("dropping stale mesh result {}", result.id());
            }
        }
        results
    }

    /// Forget an in-flight request; its result will be dropped on arrival
    pub fn cancel(&mut self, id: &str) -> bool {
        self.pending.remove(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }
}
