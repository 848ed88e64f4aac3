use crossbeam_channel::Sender;
use vm::{Event, Hooks, Track, TrackConfig};

/// Something a channel asked the host to do, tagged with where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub channel: usize,
    /// Sample pack selected when the event fired
    pub pack: usize,
    pub event: Event,
}

/// Forwards hook calls into the player's cue queue
#[derive(derive_more::Debug, Clone)]
pub struct Router {
    channel: usize,
    pack_count: usize,
    instrument: u8,
    #[debug(ignore)]
    cues: Sender<Cue>,
}

impl Router {
    fn pack(&self) -> usize {
        self.instrument as usize % self.pack_count.max(1)
    }

    fn send(&self, event: Event) {
        // the player owns the receiver, so this only fails while it is being dropped
        let _ = self.cues.send(Cue {
            channel: self.channel,
            pack: self.pack(),
            event,
        });
    }
}

impl Hooks for Router {
    fn on_halt(&mut self) {
        self.send(Event::Halt);
    }

    fn on_syscall(&mut self, code: u16) {
        self.send(Event::Syscall(code));
    }

    fn on_instrument(&mut self, instrument: u8) {
        self.instrument = instrument;
        self.send(Event::Instrument(instrument));
    }

    fn on_play(&mut self, note: u8) {
        self.send(Event::Play(note));
    }
}

/// A track bound to a slot in the player
#[derive(Debug, Clone)]
pub struct Channel {
    track: Track<Router>,
}

impl Channel {
    /// A parked channel, waiting for [Channel::start]
    pub fn new(
        index: usize,
        base: u16,
        pack_count: usize,
        config: TrackConfig,
        cues: Sender<Cue>,
    ) -> Self {
        let router = Router {
            channel: index,
            pack_count,
            instrument: 0,
            cues,
        };
        let mut channel = Self {
            track: Track::with_config(base, router, config),
        };
        channel.restart();
        channel
    }

    /// Rewind to the top of the program and park
    pub fn restart(&mut self) {
        self.track.reset();
        self.track.halt();
        self.track.hooks_mut().instrument = 0;
    }

    /// Rewind to the top of the program and play
    pub fn start(&mut self) {
        self.restart();
        self.track.resume();
    }

    /// Run one frame, unless the channel is parked or has halted
    pub fn frame(&mut self, bytecode: &[u8]) {
        if !self.track.halted() {
            self.track.dispatch(bytecode);
        }
    }

    pub fn index(&self) -> usize {
        self.track.hooks().channel
    }

    pub fn pack(&self) -> usize {
        self.track.hooks().pack()
    }

    pub fn track(&self) -> &Track<Router> {
        &self.track
    }
}
