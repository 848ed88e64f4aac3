//! Host side of the sequencer: songs made of several scripts, a frame-rate divided player
//! that drives one channel per script, and a background pump feeding cues to an audio
//! backend.
pub mod channel;
pub mod export;
pub mod threads;
#[cfg(feature = "tracing")]
mod trace;

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eyre::{ensure, Result};
use tracing::{debug, instrument};
use vm::TrackConfig;

pub use channel::{Channel, Cue};

/// Several programs packed into one buffer, each starting at its own base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    bytecode: Vec<u8>,
    bases: Vec<u16>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile each script and pack them back to back, one channel per script
    pub fn compile<'a>(sources: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        sources
            .into_iter()
            .try_fold(Self::new(), |song, src| song.with_track(lang::compile_source(src)?))
    }

    /// Append a program. It gets a channel whose base is the current end of the buffer.
    pub fn with_track(mut self, bytecode: impl Into<Vec<u8>>) -> Result<Self> {
        let base = self.bytecode.len();
        ensure!(
            base <= u16::MAX as usize,
            "track starts at byte {base}, past the 16 bit address space"
        );
        self.bases.push(base as u16);
        self.bytecode.extend(bytecode.into());
        Ok(self)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn bases(&self) -> &[u16] {
        &self.bases
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Frames skipped after every frame that dispatches
    pub frames_per_tick: u16,
    /// Sample packs instruments are folded onto
    pub pack_count: usize,
    pub track: TrackConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frames_per_tick: 1,
            pack_count: 6,
            track: TrackConfig::default(),
        }
    }
}

/// Plays a [Song], one frame at a time
#[derive(derive_more::Debug)]
pub struct Player {
    config: PlayerConfig,
    #[debug("{} bytes", bytecode.len())]
    bytecode: Arc<[u8]>,
    channels: Vec<Channel>,
    frame_counter: u16,
    playing: bool,
    #[debug(ignore)]
    tx: Sender<Cue>,
    #[debug(ignore)]
    rx: Receiver<Cue>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        let (tx, rx) = unbounded();
        Self {
            config,
            bytecode: Arc::from(Vec::new()),
            channels: vec![],
            frame_counter: 0,
            playing: false,
            tx,
            rx,
        }
    }

    /// Swap in a new song. Every channel restarts, and keeps playing if the player was.
    #[instrument(skip_all, fields(bytes = song.bytes().len(), channels = song.bases().len()))]
    pub fn load(&mut self, song: Song) {
        self.bytecode = Arc::from(song.bytecode);
        self.channels = song
            .bases
            .iter()
            .enumerate()
            .map(|(index, base)| {
                Channel::new(
                    index,
                    *base,
                    self.config.pack_count,
                    self.config.track,
                    self.tx.clone(),
                )
            })
            .collect();
        // cues from the old song are stale
        self.rx.try_iter().for_each(drop);
        if self.playing {
            self.run();
        }
    }

    /// Start every channel from the top
    pub fn run(&mut self) {
        debug!("run");
        self.playing = true;
        self.frame_counter = 0;
        self.channels.iter_mut().for_each(Channel::start);
    }

    /// Rewind every channel and park it
    pub fn stop(&mut self) {
        debug!("stop");
        self.playing = false;
        self.channels.iter_mut().for_each(Channel::restart);
    }

    /// Advance one host frame and collect what the channels asked for.
    ///
    /// Channels only dispatch on every `frames_per_tick + 1`th frame.
    pub fn frame(&mut self) -> Vec<Cue> {
        if self.frame_counter > 0 {
            self.frame_counter -= 1;
            return vec![];
        }
        self.frame_counter = self.config.frames_per_tick;

        for channel in &mut self.channels {
            channel.frame(&self.bytecode);
        }
        self.rx.try_iter().collect()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once every channel halted on its own
    pub fn finished(&self) -> bool {
        self.playing && self.channels.iter().all(|c| c.track().halted())
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn set_frames_per_tick(&mut self, frames: u16) {
        self.config.frames_per_tick = frames;
    }
}
