use std::{
    sync::{atomic::Ordering, Arc},
    thread::{sleep, spawn, JoinHandle},
    time::Duration,
};

use atomic_float::AtomicF32;
use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use tracing::{debug, trace};
use triple_buffer::{triple_buffer, Input};

use crate::{Cue, Player, PlayerConfig, Song};

pub enum Message {
    Run,
    Stop,
    Shutdown,
}

/// Runs a [Player] on its own thread, one frame per period
pub struct PumpThread {
    player: Player,
    /// Seconds between two frames
    period: Arc<AtomicF32>,
    rx: Receiver<Message>,
}

pub struct PumpComms {
    pub song_in: Input<Song>,
    pub cues: Receiver<Cue>,
    pub handle: JoinHandle<()>,
}

impl PumpThread {
    pub fn new(config: PlayerConfig, period: Arc<AtomicF32>, msgs: Receiver<Message>) -> Self {
        #[cfg(feature = "tracing")]
        crate::trace::setup();

        Self {
            player: Player::new(config),
            period,
            rx: msgs,
        }
    }

    pub fn spawn(mut self) -> PumpComms {
        let (song_in, mut song_out) = triple_buffer(&Song::new());
        let (cues_in, cues_out) = unbounded();
        let handle = spawn(move || {
            #[cfg(feature = "tracing")]
            tracy_client::set_thread_name!("frame pump");
            loop {
                if song_out.updated() {
                    trace!("song update");
                    self.player.load(song_out.read().clone());
                }
                // non-blocking recv
                match self.rx.try_recv() {
                    Ok(Message::Run) => self.player.run(),
                    Ok(Message::Stop) => self.player.stop(),
                    Ok(Message::Shutdown) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }
                for cue in self.player.frame() {
                    if cues_in.send(cue).is_err() {
                        debug!("cue receiver dropped");
                        return;
                    }
                }
                sleep(frame_period(self.period.load(Ordering::Relaxed)));
            }
            debug!("frame pump stopped");
        });

        PumpComms {
            song_in,
            cues: cues_out,
            handle,
        }
    }
}

/// Negative, NaN, infinite or overflowing periods don't sleep at all
fn frame_period(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
}
