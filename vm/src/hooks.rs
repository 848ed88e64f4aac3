/// Side effects a track asks its host for
///
/// Every method is called synchronously from [crate::interpret::Track::dispatch]
/// and defaults to doing nothing.
pub trait Hooks {
    fn on_halt(&mut self) {}
    fn on_syscall(&mut self, _code: u16) {}
    fn on_instrument(&mut self, _instrument: u8) {}
    fn on_play(&mut self, _note: u8) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}

/// A hook call, as a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Halt,
    Syscall(u16),
    Instrument(u8),
    Play(u8),
}

/// Record every hook call in order
impl Hooks for Vec<Event> {
    fn on_halt(&mut self) {
        self.push(Event::Halt);
    }

    fn on_syscall(&mut self, code: u16) {
        self.push(Event::Syscall(code));
    }

    fn on_instrument(&mut self, instrument: u8) {
        self.push(Event::Instrument(instrument));
    }

    fn on_play(&mut self, note: u8) {
        self.push(Event::Play(note));
    }
}

impl<H: Hooks + ?Sized> Hooks for &mut H {
    fn on_halt(&mut self) {
        (**self).on_halt()
    }

    fn on_syscall(&mut self, code: u16) {
        (**self).on_syscall(code)
    }

    fn on_instrument(&mut self, instrument: u8) {
        (**self).on_instrument(instrument)
    }

    fn on_play(&mut self, note: u8) {
        (**self).on_play(note)
    }
}

impl<H: Hooks + ?Sized> Hooks for Box<H> {
    fn on_halt(&mut self) {
        (**self).on_halt()
    }

    fn on_syscall(&mut self, code: u16) {
        (**self).on_syscall(code)
    }

    fn on_instrument(&mut self, instrument: u8) {
        (**self).on_instrument(instrument)
    }

    fn on_play(&mut self, note: u8) {
        (**self).on_play(note)
    }
}
