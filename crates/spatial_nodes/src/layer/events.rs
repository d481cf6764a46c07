//! Event types and sinks for observing layer construction.
//!
//! [`LayerEvent`]s are emitted by [`crate::layer::assembler::create_layer_with_events`]
//! and [`crate::layer::assembler::LayerAssembler::create_with_events`]. Sinks may
//! declare interest per [`LayerEventKind`] so that expensive payloads are only built
//! when someone listens.
use crate::coordinate::Coordinate;
use crate::kernel::NodeHandle;
use crate::layer::SpatialMetadata;
use crate::value::Value;

/// Describes events emitted while a layer is created.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum LayerEvent {
    /// Emitted once the request is validated.
    LayerStarted {
        /// Model of the nodes.
        model: String,
        /// Number of nodes that will be created.
        node_count: usize,
        /// Parameter names in resolution order.
        parameters: Vec<String>,
    },

    /// Emitted after every position was generated.
    PositionsGenerated {
        count: usize,
        dimension: usize,
    },

    /// Emitted after the kernel created the nodes.
    NodesInstantiated {
        model: String,
        /// Handles in node ordinal order.
        handles: Vec<NodeHandle>,
    },

    /// Emitted after all parameters of one node were applied.
    NodeParameterized {
        ordinal: usize,
        handle: NodeHandle,
        position: Coordinate,
        /// Applied values in resolution order.
        values: Vec<(String, Value)>,
    },

    /// Emitted when the layer is complete.
    LayerFinished {
        model: String,
        size: usize,
        spatial: SpatialMetadata,
    },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. model or axis).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Payload-free discriminant of [`LayerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerEventKind {
    LayerStarted,
    PositionsGenerated,
    NodesInstantiated,
    NodeParameterized,
    LayerFinished,
    Warning,
}

impl LayerEvent {
    pub fn kind(&self) -> LayerEventKind {
        match self {
            LayerEvent::LayerStarted { .. } => LayerEventKind::LayerStarted,
            LayerEvent::PositionsGenerated { .. } => LayerEventKind::PositionsGenerated,
            LayerEvent::NodesInstantiated { .. } => LayerEventKind::NodesInstantiated,
            LayerEvent::NodeParameterized { .. } => LayerEventKind::NodeParameterized,
            LayerEvent::LayerFinished { .. } => LayerEventKind::LayerFinished,
            LayerEvent::Warning { .. } => LayerEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`LayerEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: LayerEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: LayerEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = LayerEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: LayerEvent) {}

    #[inline]
    fn wants(&self, _kind: LayerEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(LayerEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(LayerEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(LayerEvent),
{
    #[inline]
    fn send(&mut self, event: LayerEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<LayerEvent>,
    only: Option<Vec<LayerEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collects only events whose kind is listed.
    pub fn only(kinds: impl IntoIterator<Item = LayerEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<LayerEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[LayerEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: LayerEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: LayerEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[S] {
        &self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: LayerEvent) {
        let kind = event.kind();
        let Some(last_idx) = self.sinks.iter().rposition(|s| s.wants(kind)) else {
            return;
        };
        for i in 0..last_idx {
            if self.sinks[i].wants(kind) {
                self.sinks[i].send(event.clone());
            }
        }
        self.sinks[last_idx].send(event);
    }

    fn wants(&self, kind: LayerEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
