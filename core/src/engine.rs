use log::{debug, info, trace};
use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use crate::analytics::{self, RunStats};
use crate::components::{Message, MessageId, Origin, Processor, ProcessorId};
use crate::config::{RunConfig, Samplers, SentCounting};
use crate::error::SimResult;
use crate::random::Lcg;
use crate::scheduler::EventQueue;
use crate::traits::Observer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    ArrivalC2,
    ArrivalC3,
    FinishC2,
    FinishC3,
    FinishC1 { message: MessageId },
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::ArrivalC2 => write!(f, "Arrival_C2"),
            EventType::ArrivalC3 => write!(f, "Arrival_C3"),
            EventType::FinishC2 => write!(f, "Finish_C2"),
            EventType::FinishC3 => write!(f, "Finish_C3"),
            EventType::FinishC1 { message } => write!(f, "Finish_C1({})", message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    /// Insertion order, used to break timestamp ties.
    pub seq: u64,
    pub source: ProcessorId,
    pub event_type: EventType,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// One handled event, as recorded when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub time: f64,
    pub event_type: EventType,
    pub source: ProcessorId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub arrivals_c2: u64,
    pub arrivals_c3: u64,
    pub rejected_by_c3: u64,
    pub sent_by_c1: u64,
}

/// Accumulates time during which C1, C2 and C3 are all busy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrioTracker {
    busy_time: f64,
    last_check: f64,
}

impl TrioTracker {
    /// Credits `[last_check, now)` if all three were busy over that span.
    pub fn advance(&mut self, now: f64, all_busy: bool) {
        if all_busy {
            self.busy_time += now - self.last_check;
        }
        self.last_check = now;
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorView {
    pub id: ProcessorId,
    pub busy: bool,
    pub current: Option<MessageId>,
    pub queue: Vec<MessageId>,
    pub busy_time: f64,
}

/// Read-only view of a run after an event has been handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub run_index: u32,
    pub clock: f64,
    pub processors: Vec<ProcessorView>,
    pub counters: Counters,
    pub trio_time: f64,
    pub last_message: Option<MessageId>,
    pub pending_events: usize,
}

impl Snapshot {
    pub fn processor(&self, id: ProcessorId) -> Option<&ProcessorView> {
        self.processors.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    /// No events left.
    Drained,
    /// The next event lies beyond the horizon.
    Truncated,
}

pub struct Simulation {
    pub time: f64,
    config: RunConfig,
    samplers: Samplers,
    rng: Lcg,
    events: EventQueue,
    c1: Processor,
    c2: Processor,
    c3: Processor,
    messages: Vec<Message>,
    counters: Counters,
    trio: TrioTracker,
    trace: Vec<TraceEntry>,
    last_event: Option<Event>,
    state: RunState,
}

impl Simulation {
    /// Builds a run from `config`, seeding the generator with `config.seed`
    /// and scheduling the first arrivals at C2 and C3 at t=0.
    pub fn new(config: RunConfig) -> SimResult<Self> {
        config.validate()?;
        let samplers = config.model.samplers()?;
        let rng = Lcg::new(config.seed);
        Ok(Self::with_rng(config, samplers, rng))
    }

    fn with_rng(config: RunConfig, samplers: Samplers, rng: Lcg) -> Self {
        let mut sim = Self {
            time: 0.0,
            config,
            samplers,
            rng,
            events: EventQueue::new(),
            c1: Processor::new(ProcessorId::C1),
            c2: Processor::new(ProcessorId::C2),
            c3: Processor::new(ProcessorId::C3),
            messages: Vec::new(),
            counters: Counters::default(),
            trio: TrioTracker::default(),
            trace: Vec::new(),
            last_event: None,
            state: RunState::Running,
        };
        sim.events.schedule(0.0, ProcessorId::C2, EventType::ArrivalC2);
        sim.events.schedule(0.0, ProcessorId::C3, EventType::ArrivalC3);
        sim
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn horizon(&self) -> f64 {
        self.config.horizon
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn processor(&self, id: ProcessorId) -> &Processor {
        match id {
            ProcessorId::C1 => &self.c1,
            ProcessorId::C2 => &self.c2,
            ProcessorId::C3 => &self.c3,
        }
    }

    fn processor_mut(&mut self, id: ProcessorId) -> &mut Processor {
        match id {
            ProcessorId::C1 => &mut self.c1,
            ProcessorId::C2 => &mut self.c2,
            ProcessorId::C3 => &mut self.c3,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.index())
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn trio_time(&self) -> f64 {
        self.trio.busy_time()
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Messages created but not yet completed or rejected.
    pub fn in_flight(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_terminal()).count()
    }

    pub fn is_trio_busy(&self) -> bool {
        self.c1.is_busy() && self.c2.is_busy() && self.c3.is_busy()
    }

    /// Handles the next event. Returns `false` once the run is over.
    pub fn step(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        match self.events.peek_time() {
            None => {
                self.state = RunState::Drained;
                return false;
            }
            Some(t) if t > self.config.horizon => {
                self.state = RunState::Truncated;
                return false;
            }
            Some(_) => {}
        }
        let event = match self.events.pop_next() {
            Ok(event) => event,
            Err(_) => {
                self.state = RunState::Drained;
                return false;
            }
        };

        let all_busy = self.is_trio_busy();
        self.trio.advance(event.time, all_busy);
        self.time = event.time;
        debug!(
            "run {} t={:.4} {} from {}",
            self.config.run_index, self.time, event.event_type, event.source
        );

        match event.event_type {
            EventType::ArrivalC2 => self.on_arrival(Origin::C2),
            EventType::ArrivalC3 => self.on_arrival(Origin::C3),
            EventType::FinishC2 => self.on_finish_c2(),
            EventType::FinishC3 => self.on_finish_c3(),
            EventType::FinishC1 { message } => self.on_finish_c1(message),
        }

        if self.config.record_trace {
            self.trace.push(TraceEntry {
                time: event.time,
                event_type: event.event_type,
                source: event.source,
            });
        }
        self.last_event = Some(event);
        true
    }

    pub fn run(&mut self) {
        while self.step() {}
        self.log_summary();
    }

    /// Like `run`, reporting every handled event to `observer` and pausing
    /// `pace_ms` between events when configured.
    pub fn run_with(&mut self, observer: &mut dyn Observer) {
        let pace = self.config.pace_ms.map(Duration::from_millis);
        while self.step() {
            if let Some(event) = self.last_event.clone() {
                observer.on_step(&event, &self.snapshot());
            }
            if let Some(pace) = pace {
                std::thread::sleep(pace);
            }
        }
        self.log_summary();
    }

    fn log_summary(&self) {
        info!(
            "run {} finished at t={:.2} ({:?}): {} messages, {} rejected, {} sent by C1",
            self.config.run_index,
            self.time,
            self.state,
            self.messages.len(),
            self.counters.rejected_by_c3,
            self.counters.sent_by_c1
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            run_index: self.config.run_index,
            clock: self.time,
            processors: ProcessorId::ALL
                .iter()
                .map(|&id| {
                    let p = self.processor(id);
                    ProcessorView {
                        id,
                        busy: p.is_busy(),
                        current: p.current(),
                        queue: p.queue().iter().copied().collect(),
                        busy_time: p.busy_time(),
                    }
                })
                .collect(),
            counters: self.counters,
            trio_time: self.trio.busy_time(),
            last_message: self.messages.last().map(|m| m.id),
            pending_events: self.events.len(),
        }
    }

    pub fn collect_stats(&self) -> SimResult<RunStats> {
        analytics::collect(self)
    }

    fn on_arrival(&mut self, origin: Origin) {
        let now = self.time;
        let pid = origin.processor();
        let id = MessageId(self.messages.len() as u64);
        self.messages.push(Message::new(id, origin, now));
        self.processor_mut(pid).enqueue(id);
        match origin {
            Origin::C2 => self.counters.arrivals_c2 += 1,
            Origin::C3 => self.counters.arrivals_c3 += 1,
        }

        if !self.processor(pid).is_busy() {
            self.start_service(pid);
        }

        let (gap, next_type) = match origin {
            Origin::C2 => (self.samplers.c2_arrival.sample(&mut self.rng), EventType::ArrivalC2),
            Origin::C3 => (self.samplers.c3_arrival.sample(&mut self.rng), EventType::ArrivalC3),
        };
        let next = now + gap;
        if next <= self.config.horizon {
            self.events.schedule(next, pid, next_type);
        }
    }

    fn on_finish_c2(&mut self) {
        let now = self.time;
        if let Some(id) = self.c2.finish(now) {
            self.forward_to_c1(id);
        }
        self.start_service(ProcessorId::C2);
    }

    fn on_finish_c3(&mut self) {
        let now = self.time;
        if let Some(id) = self.c3.finish(now) {
            if self.samplers.c3_reject.sample(&mut self.rng) {
                self.messages[id.index()].reject(now);
                self.counters.rejected_by_c3 += 1;
                trace!("{} rejected by C3 at t={:.4}", id, now);
            } else {
                self.forward_to_c1(id);
            }
        }
        self.start_service(ProcessorId::C3);
    }

    fn on_finish_c1(&mut self, message: MessageId) {
        let now = self.time;
        let served = self.c1.finish(now);
        debug_assert_eq!(served, Some(message), "C1 finished a message it was not serving");
        self.counters.sent_by_c1 += 1;

        let origin = self.messages[message.index()].origin;
        let returns = match origin {
            Origin::C2 => self.samplers.c2_return.sample(&mut self.rng),
            Origin::C3 => self.samplers.c3_return.sample(&mut self.rng),
        };

        if returns {
            let pid = origin.processor();
            self.messages[message.index()].requeue(now);
            self.processor_mut(pid).enqueue(message);
            trace!("{} sent back to {} at t={:.4}", message, pid, now);
            if !self.processor(pid).is_busy() {
                self.start_service(pid);
            }
        } else {
            self.messages[message.index()].complete(now);
            if self.config.sent_counting == SentCounting::Legacy {
                self.counters.sent_by_c1 += 1;
            }
        }

        self.start_service(ProcessorId::C1);
    }

    fn forward_to_c1(&mut self, id: MessageId) {
        self.c1.enqueue(id);
        if !self.c1.is_busy() {
            self.start_service(ProcessorId::C1);
        }
    }

    /// Puts the head of `pid`'s queue into service and schedules its finish.
    /// Does nothing, and draws nothing, when the queue is empty.
    fn start_service(&mut self, pid: ProcessorId) {
        let now = self.time;
        let id = match self.processor_mut(pid).begin_next(now) {
            Some(id) => id,
            None => return,
        };
        self.messages[id.index()].start_proc_time = Some(now);

        let (duration, event_type) = match pid {
            ProcessorId::C1 => (
                self.samplers.c1_service.sample(&mut self.rng).max(0.0),
                EventType::FinishC1 { message: id },
            ),
            ProcessorId::C2 => (self.samplers.c2_service.sample(&mut self.rng), EventType::FinishC2),
            ProcessorId::C3 => (self.samplers.c3_service.sample(&mut self.rng), EventType::FinishC3),
        };
        trace!("{} starts {} at t={:.4} for {:.4}s", pid, id, now, duration);
        self.events.schedule(now + duration, pid, event_type);
    }
}
