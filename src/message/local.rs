//! In-process message-passing runtime.
//!
//! Each rank runs on its own scoped thread and owns its data; ranks interact
//! only by moving byte buffers through `crossbeam-channel` queues. The
//! topology is a star: workers are linked to the coordinator only, so when a
//! rank exits early every rank waiting on it observes a disconnect instead of
//! blocking forever. A rank that is alive but stuck still blocks the group;
//! there are no timeouts.
use super::comm::{Communicator, COORDINATOR};
use crate::error::{Result, StencilError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use std::cell::RefCell;
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Broadcast,
    Scatter,
    Gather,
}

struct Envelope {
    from: usize,
    tag: Tag,
    payload: Vec<u8>,
}

/// Endpoint of one rank in a [`LocalWorld`].
pub struct LocalComm {
    rank: usize,
    size: usize,
    inbox: Receiver<Envelope>,
    // Indexed by destination rank.
    links: Vec<Option<Sender<Envelope>>>,
    // Messages that arrived ahead of the collective they belong to.
    pending: RefCell<Vec<Envelope>>,
}

impl LocalComm {
    fn send(&self, to: usize, tag: Tag, payload: Vec<u8>) -> Result<()> {
        let link = self
            .links
            .get(to)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                StencilError::Communication(format!("rank {} has no link to rank {to}", self.rank))
            })?;
        link.send(Envelope {
            from: self.rank,
            tag,
            payload,
        })
        .map_err(|_| StencilError::Communication(format!("rank {to} is gone ({tag:?})")))
    }

    /// Next message tagged `tag`, optionally from a rank accepted by `want`.
    fn recv(&self, tag: Tag, want: impl Fn(usize) -> bool) -> Result<Envelope> {
        {
            let mut pending = self.pending.borrow_mut();
            if let Some(pos) = pending.iter().position(|e| e.tag == tag && want(e.from)) {
                return Ok(pending.remove(pos));
            }
        }
        loop {
            let env = self.inbox.recv().map_err(|_| {
                StencilError::Communication(format!(
                    "rank {} lost its peers while waiting for {tag:?}",
                    self.rank
                ))
            })?;
            if env.tag == tag && want(env.from) {
                return Ok(env);
            }
            self.pending.borrow_mut().push(env);
        }
    }
}

impl Communicator for LocalComm {
    #[inline]
    fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>> {
        if self.is_coordinator() {
            let payload = payload.ok_or_else(|| {
                StencilError::Communication("coordinator broadcast without payload".to_string())
            })?;
            for to in 1..self.size {
                self.send(to, Tag::Broadcast, payload.clone())?;
            }
            Ok(payload)
        } else {
            Ok(self.recv(Tag::Broadcast, |from| from == COORDINATOR)?.payload)
        }
    }

    fn scatter(&self, payloads: Option<Vec<Vec<u8>>>) -> Result<Vec<u8>> {
        if self.is_coordinator() {
            let payloads = payloads.ok_or_else(|| {
                StencilError::Communication("coordinator scatter without payloads".to_string())
            })?;
            if payloads.len() != self.size {
                return Err(StencilError::Communication(format!(
                    "scatter needs {} payloads, got {}",
                    self.size,
                    payloads.len()
                )));
            }
            let mut own = Vec::new();
            for (to, payload) in payloads.into_iter().enumerate() {
                if to == COORDINATOR {
                    own = payload;
                } else {
                    self.send(to, Tag::Scatter, payload)?;
                }
            }
            Ok(own)
        } else {
            Ok(self.recv(Tag::Scatter, |from| from == COORDINATOR)?.payload)
        }
    }

    fn gather(&self, slice: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>> {
        if !self.is_coordinator() {
            self.send(COORDINATOR, Tag::Gather, slice)?;
            return Ok(None);
        }
        let mut slices: Vec<Option<Vec<u8>>> = vec![None; self.size];
        slices[COORDINATOR] = Some(slice);
        for _ in 1..self.size {
            let env = self.recv(Tag::Gather, |from| from < slices.len() && slices[from].is_none())?;
            slices[env.from] = Some(env.payload);
        }
        Ok(Some(slices.into_iter().flatten().collect()))
    }
}

/// A group of `size` ranks living in the current process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalWorld {
    size: usize,
}

impl LocalWorld {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(StencilError::Partition(
                "a message-passing group needs at least one rank".to_string(),
            ));
        }
        Ok(Self { size })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Endpoints for every rank, wired as a star around the coordinator.
    pub fn connect(&self) -> Vec<LocalComm> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..self.size).map(|_| unbounded()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let links = (0..self.size)
                    .map(|to| {
                        let linked = to != rank && (rank == COORDINATOR || to == COORDINATOR);
                        linked.then(|| senders[to].clone())
                    })
                    .collect();
                LocalComm {
                    rank,
                    size: self.size,
                    inbox,
                    links,
                    pending: RefCell::new(Vec::new()),
                }
            })
            .collect()
    }

    /// Run `f` on every rank concurrently and return the results in rank
    /// order.
    ///
    /// Any failing rank fails the whole run. When several ranks fail, the
    /// first error that is not a mere disconnect is reported, since
    /// disconnects are usually the echo of another rank's failure.
    pub fn run<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&LocalComm) -> Result<T> + Sync,
    {
        let comms = self.connect();
        let results: Vec<Result<T>> = thread::scope(|s| {
            let f = &f;
            let mut handles = Vec::with_capacity(comms.len());
            for comm in comms {
                let rank = comm.rank;
                let spawned = thread::Builder::new()
                    .name(format!("rank-{rank}"))
                    .spawn_scoped(s, move || {
                        debug!("rank {rank} started");
                        let out = f(&comm);
                        debug!("rank {rank} finished ok={}", out.is_ok());
                        out
                    });
                handles.push((rank, spawned));
            }
            handles
                .into_iter()
                .map(|(rank, spawned)| match spawned {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        Err(StencilError::Communication(format!("rank {rank} panicked")))
                    }),
                    Err(e) => Err(StencilError::Communication(format!(
                        "failed to start rank {rank}: {e}"
                    ))),
                })
                .collect()
        });

        let mut first_comm_err = None;
        let mut outputs = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(v) => outputs.push(v),
                Err(StencilError::Communication(msg)) => {
                    first_comm_err.get_or_insert(StencilError::Communication(msg));
                }
                Err(e) => return Err(e),
            }
        }
        match first_comm_err {
            Some(e) => Err(e),
            None => Ok(outputs),
        }
    }
}
