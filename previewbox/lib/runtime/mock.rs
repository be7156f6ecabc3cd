use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::RwLock;

use crate::{PreviewboxError, PreviewboxResult};

use super::{IsolationRuntime, OutputStream, UnitSpec};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runtime operations a [`MockRuntime`] can be told to fail or hang on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeOp {
    /// `create`
    Create,

    /// `start`
    Start,

    /// `stop`
    Stop,

    /// `remove`
    Remove,

    /// `exec`
    Exec,
}

/// State of a unit known to a [`MockRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockUnitState {
    /// Created but never started.
    Created,

    /// Started.
    Running,

    /// Stopped but not removed.
    Stopped,
}

/// How the exec output stream of a [`MockRuntime`] ends after its chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamEnd {
    /// The stream finishes.
    #[default]
    Finish,

    /// The stream yields an error.
    Fail,

    /// The stream never yields again.
    Hang,
}

/// An in-memory isolation runtime that records every call.
///
/// Units behave like containers: stopping an unknown or already stopped unit fails,
/// removing an unknown unit fails, and exec only works on running units.
#[derive(Debug, Default)]
pub struct MockRuntime {
    next_id: AtomicU64,
    units: RwLock<HashMap<String, MockUnitState>>,
    calls: RwLock<Vec<MockCall>>,
    failing: RwLock<HashSet<RuntimeOp>>,
    hanging: RwLock<HashSet<RuntimeOp>>,
    output: RwLock<Vec<Bytes>>,
    output_end: RwLock<StreamEnd>,
}

/// A call recorded by a [`MockRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `create` with the spec it was given.
    Create(UnitSpec),

    /// `start` of a unit id.
    Start(String),

    /// `stop` of a unit id.
    Stop(String),

    /// `remove` of a unit id.
    Remove(String),

    /// `exec` of an argv in a unit id.
    Exec(String, Vec<String>),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MockRuntime {
    /// Creates a runtime with no units.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future call of `op` fail.
    pub async fn fail_on(&self, op: RuntimeOp) {
        self.failing.write().await.insert(op);
    }

    /// Makes every future call of `op` never complete.
    pub async fn hang_on(&self, op: RuntimeOp) {
        self.hanging.write().await.insert(op);
    }

    /// Sets the chunks every exec streams back.
    pub async fn set_exec_output<I, B>(&self, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        *self.output.write().await = chunks.into_iter().map(Into::into).collect();
    }

    /// Sets how every exec stream ends once its chunks are delivered.
    pub async fn set_exec_end(&self, end: StreamEnd) {
        *self.output_end.write().await = end;
    }

    /// Removes a unit behind the caller's back, as if it died or was deleted externally.
    pub async fn remove_out_of_band(&self, unit_id: &str) {
        self.units.write().await.remove(unit_id);
    }

    /// Returns every call made so far, in order.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    /// Returns the state of a unit, if it exists.
    pub async fn unit_state(&self, unit_id: &str) -> Option<MockUnitState> {
        self.units.read().await.get(unit_id).copied()
    }

    /// Returns the number of units that exist.
    pub async fn unit_count(&self) -> usize {
        self.units.read().await.len()
    }

    async fn enter(&self, op: RuntimeOp, call: MockCall) -> PreviewboxResult<()> {
        self.calls.write().await.push(call);

        if self.hanging.read().await.contains(&op) {
            futures::future::pending::<()>().await;
        }

        if self.failing.read().await.contains(&op) {
            return Err(PreviewboxError::custom(anyhow::anyhow!(
                "mock runtime: {op:?} failed"
            )));
        }

        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait::async_trait]
impl IsolationRuntime for MockRuntime {
    async fn create(&self, spec: &UnitSpec) -> PreviewboxResult<String> {
        self.enter(RuntimeOp::Create, MockCall::Create(spec.clone()))
            .await?;

        let id = format!("{:064x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.units
            .write()
            .await
            .insert(id.clone(), MockUnitState::Created);

        Ok(id)
    }

    async fn start(&self, unit_id: &str) -> PreviewboxResult<()> {
        self.enter(RuntimeOp::Start, MockCall::Start(unit_id.to_string()))
            .await?;

        match self.units.write().await.get_mut(unit_id) {
            Some(state) => {
                *state = MockUnitState::Running;
                Ok(())
            }
            None => Err(no_such_unit(unit_id)),
        }
    }

    async fn stop(&self, unit_id: &str) -> PreviewboxResult<()> {
        self.enter(RuntimeOp::Stop, MockCall::Stop(unit_id.to_string()))
            .await?;

        match self.units.write().await.get_mut(unit_id) {
            Some(state) if *state == MockUnitState::Running => {
                *state = MockUnitState::Stopped;
                Ok(())
            }
            Some(_) => Err(PreviewboxError::custom(anyhow::anyhow!(
                "mock runtime: unit {unit_id} is not running"
            ))),
            None => Err(no_such_unit(unit_id)),
        }
    }

    async fn remove(&self, unit_id: &str) -> PreviewboxResult<()> {
        self.enter(RuntimeOp::Remove, MockCall::Remove(unit_id.to_string()))
            .await?;

        match self.units.write().await.remove(unit_id) {
            Some(_) => Ok(()),
            None => Err(no_such_unit(unit_id)),
        }
    }

    async fn exec(&self, unit_id: &str, argv: &[String]) -> PreviewboxResult<OutputStream> {
        self.enter(
            RuntimeOp::Exec,
            MockCall::Exec(unit_id.to_string(), argv.to_vec()),
        )
        .await?;

        match self.units.read().await.get(unit_id) {
            Some(MockUnitState::Running) => {}
            Some(_) => {
                return Err(PreviewboxError::custom(anyhow::anyhow!(
                    "mock runtime: unit {unit_id} is not running"
                )))
            }
            None => return Err(no_such_unit(unit_id)),
        }

        let chunks = self.output.read().await.clone();
        let end: OutputStream = match *self.output_end.read().await {
            StreamEnd::Finish => futures::stream::empty().boxed(),
            StreamEnd::Fail => futures::stream::once(futures::future::ready(Err(
                PreviewboxError::custom(anyhow::anyhow!("mock runtime: exec stream broke")),
            )))
            .boxed(),
            StreamEnd::Hang => futures::stream::pending().boxed(),
        };

        Ok(futures::stream::iter(chunks.into_iter().map(Ok))
            .chain(end)
            .boxed())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn no_such_unit(unit_id: &str) -> PreviewboxError {
    PreviewboxError::custom(anyhow::anyhow!("mock runtime: no such unit {unit_id}"))
}
