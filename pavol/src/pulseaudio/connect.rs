use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

use libpulse_binding::callbacks::ListResult;
use libpulse_binding::context::introspect::SinkInfo;
use libpulse_binding::context::{Context, FlagSet, State};
use libpulse_binding::error::PAErr;
use libpulse_binding::mainloop::standard::{IterateResult, Mainloop};
use libpulse_binding::operation::{self, Operation};
use libpulse_binding::proplist::{properties, Proplist};
use libpulse_binding::volume::{ChannelVolumes, Volume};
use tracing::debug;

use super::api::{SinkControl, STEREO_CHANNELS};
use super::error::{BridgeError, ConnectError};
use super::util::uniform_channel_volumes;

type Ctx = Rc<RefCell<Context>>;

#[derive(Clone, Copy)]
struct SinkState {
    muted: bool,
    channels: ChannelVolumes,
    /// Average of `channels`
    volume: Volume,
}

/// The parts of a sink info reply the session keeps
trait SinkReading {
    fn mute(&self) -> bool;
    fn channel_volumes(&self) -> ChannelVolumes;
}

impl SinkReading for SinkInfo<'_> {
    fn mute(&self) -> bool {
        self.mute
    }

    fn channel_volumes(&self) -> ChannelVolumes {
        self.volume
    }
}

impl SinkState {
    /// Takes one callback of a sink info request. Returns `false` if the server reported an
    /// error; the state is left untouched in that case and for the end-of-list marker.
    fn apply<R: SinkReading + ?Sized>(&mut self, result: ListResult<&R>) -> bool {
        match result {
            // The result we wanted, act on it
            ListResult::Item(info) => {
                self.muted = info.mute();
                self.channels = info.channel_volumes();
                self.volume = self.channels.avg();
                true
            }
            // We reached the end of the list, which carries no data
            ListResult::End => true,
            ListResult::Error => false,
        }
    }
}

/// A connection to PulseAudio, driven from the calling thread.
///
/// PulseAudio's API is asynchronous: every request returns an operation whose callbacks only run
/// while the mainloop is being iterated. Each method here issues one request and then iterates the
/// (standard, non-threaded) mainloop until that operation is no longer running, so callers see a
/// plain blocking call. No timeouts are applied; an unresponsive server blocks indefinitely.
///
/// Nothing here is thread safe, and nothing needs to be: there is exactly one thread of control.
/// Dropping the session disconnects it.
pub struct Session {
    // declared before `mainloop` so the context is released first
    ctx: Ctx,
    mainloop: Rc<RefCell<Mainloop>>,
    sink: Rc<RefCell<SinkState>>,
    default_sink: Option<String>,
    connected: bool,
}

impl Session {
    // https://freedesktop.org/software/pulseaudio/doxygen/mainloop_8h.html
    // https://gavv.net/articles/pulseaudio-under-the-hood/#asynchronous-api
    /// Connects to the server and blocks until the connection is ready.
    ///
    /// `server` is a PulseAudio server string; `None` lets libpulse pick (`PULSE_SERVER`, the
    /// user's config, then the local daemon).
    pub fn connect(app_name: &str, server: Option<&str>) -> Result<Session, ConnectError> {
        let mut proplist = Proplist::new().ok_or(ConnectError::Setup("property list"))?;
        proplist
            .set_str(properties::APPLICATION_NAME, app_name)
            .map_err(|_| ConnectError::Setup("property list"))?;

        let mainloop = Rc::new(RefCell::new(
            Mainloop::new().ok_or(ConnectError::Setup("mainloop"))?,
        ));
        let ctx = Rc::new(RefCell::new(
            Context::new_with_proplist(
                mainloop.borrow().deref(),
                &format!("{}Context", app_name),
                &proplist,
            )
            .ok_or(ConnectError::Setup("context"))?,
        ));

        // observe state changes
        let state = Rc::new(Cell::new(State::Unconnected));
        {
            let state = Rc::clone(&state);
            let context_ref = Rc::downgrade(&ctx);
            ctx.borrow_mut().set_state_callback(Some(Box::new(move || {
                if let Some(context_ref) = context_ref.upgrade() {
                    // SAFETY: this runs on our thread, either while iterating the mainloop or from
                    // inside `connect`; in both cases nothing else touches the context and we only
                    // read from it
                    state.set(unsafe { (*context_ref.as_ptr()).get_state() });
                }
            })));
        }

        ctx.borrow_mut()
            .connect(server, FlagSet::NOFLAGS, None)
            .map_err(|e| ConnectError::Refused(describe(e)))?;

        // from here on, dropping the session on an error path tears the connection down
        let session = Session {
            ctx,
            mainloop,
            sink: Rc::new(RefCell::new(SinkState {
                muted: false,
                channels: uniform_channel_volumes(0, Volume::MUTED),
                volume: Volume::MUTED,
            })),
            default_sink: None,
            connected: true,
        };

        // loop, waiting for context to be ready
        loop {
            match state.get() {
                State::Ready => break,
                State::Failed | State::Terminated => {
                    let reason = describe(session.ctx.borrow().errno());
                    return Err(ConnectError::Failed(reason));
                }
                _ => session
                    .pump()
                    .map_err(|e| ConnectError::Failed(e.to_string()))?,
            }
        }

        // context is ready now, so remove set state callback
        session.ctx.borrow_mut().set_state_callback(None);
        debug!(server = ?session.ctx.borrow().get_server(), "connected");

        Ok(session)
    }

    /// Tears down the connection. Safe to call more than once; only the first call has an effect.
    /// The mainloop itself is freed when the session is dropped.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }

        self.connected = false;
        self.default_sink = None;
        self.ctx.borrow_mut().disconnect();
        debug!("disconnected");
    }

    /// Name of the default sink, as of the last [`Session::fetch_default_sink_name`]
    pub fn default_sink_name(&self) -> Option<&str> {
        self.default_sink.as_deref()
    }

    /// Number of channels in the last volume read from, or written to, the default sink
    pub fn channel_count(&self) -> u8 {
        self.sink.borrow().channels.len()
    }

    /// Asks the server for its default sink and remembers its name for every later call.
    pub fn fetch_default_sink_name(&mut self) -> Result<(), BridgeError> {
        self.default_sink = None;

        let name = Rc::new(RefCell::new(None::<String>));
        let op = {
            let name = Rc::clone(&name);
            self.ctx.borrow_mut().introspect().get_server_info(move |info| {
                *name.borrow_mut() = info.default_sink_name.as_ref().map(|cow| cow.to_string());
            })
        };
        self.await_operation("server info request", op)?;

        self.default_sink = name.take();
        match self.default_sink {
            Some(ref name) => {
                debug!(sink = %name, "found default sink");
                Ok(())
            }
            None => Err(BridgeError::NoDefaultSink),
        }
    }

    /// Reads volume and mute state of the default sink, replacing the locally tracked state.
    pub fn fetch_volume_state(&mut self) -> Result<(), BridgeError> {
        let name = self.default_sink.as_deref().ok_or(BridgeError::NoDefaultSink)?;

        let failed = Rc::new(Cell::new(false));
        let op = {
            let sink = Rc::clone(&self.sink);
            let failed = Rc::clone(&failed);
            self.ctx.borrow_mut().introspect().get_sink_info_by_name(
                name,
                move |result: ListResult<&SinkInfo>| {
                    if !sink.borrow_mut().apply(result) {
                        failed.set(true);
                    }
                },
            )
        };
        self.await_operation("sink info request", op)?;

        if failed.get() {
            return Err(self.rejected("sink info request"));
        }

        let sink = self.sink.borrow();
        debug!(volume = sink.volume.0, muted = sink.muted, "read sink state");
        Ok(())
    }

    /// Iterates the mainloop once, blocking until at least one event has been dispatched.
    fn pump(&self) -> Result<(), BridgeError> {
        match self.mainloop.borrow_mut().iterate(true) {
            IterateResult::Success(_) => Ok(()),
            IterateResult::Quit(retval) => {
                Err(BridgeError::Pump(format!("mainloop quit with {}", retval.0)))
            }
            IterateResult::Err(e) => Err(BridgeError::Pump(describe(e))),
        }
    }

    /// Pumps the mainloop until `op` has completed or was cancelled. The operation is released
    /// when this returns, whatever the outcome.
    fn await_operation<F: ?Sized + 'static>(
        &self,
        what: &'static str,
        op: Operation<F>,
    ) -> Result<(), BridgeError> {
        while op.get_state() == operation::State::Running {
            self.pump()?;
        }

        match op.get_state() {
            operation::State::Cancelled => Err(BridgeError::Cancelled(what)),
            _ => {
                debug!("{} complete", what);
                Ok(())
            }
        }
    }

    fn success_cb(success: &Rc<Cell<bool>>) -> Box<dyn FnMut(bool)> {
        let success = Rc::clone(success);
        Box::new(move |ok: bool| success.set(ok))
    }

    fn rejected(&self, op: &'static str) -> BridgeError {
        BridgeError::Rejected {
            op,
            reason: describe(self.ctx.borrow().errno()),
        }
    }
}

impl SinkControl for Session {
    fn volume(&self) -> u32 {
        self.sink.borrow().volume.0
    }

    fn muted(&self) -> bool {
        self.sink.borrow().muted
    }

    fn set_volume(&mut self, volume: u32) -> Result<(), BridgeError> {
        let name = self.default_sink.clone().ok_or(BridgeError::NoDefaultSink)?;
        let volume = checked_volume(volume)?;

        let channels = uniform_channel_volumes(STEREO_CHANNELS, volume);
        {
            let mut sink = self.sink.borrow_mut();
            sink.channels = channels;
            sink.volume = volume;
        }

        let success = Rc::new(Cell::new(false));
        let op = self.ctx.borrow_mut().introspect().set_sink_volume_by_name(
            &name,
            &channels,
            Some(Self::success_cb(&success)),
        );
        self.await_operation("set volume request", op)?;

        match success.get() {
            true => Ok(()),
            false => Err(self.rejected("set volume request")),
        }
    }

    fn set_mute(&mut self, mute: bool) -> Result<(), BridgeError> {
        let name = self.default_sink.clone().ok_or(BridgeError::NoDefaultSink)?;

        self.sink.borrow_mut().muted = mute;

        let success = Rc::new(Cell::new(false));
        let op = self.ctx.borrow_mut().introspect().set_sink_mute_by_name(
            &name,
            mute,
            Some(Self::success_cb(&success)),
        );
        self.await_operation("set mute request", op)?;

        match success.get() {
            true => Ok(()),
            false => Err(self.rejected("set mute request")),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn describe(err: PAErr) -> String {
    err.to_string()
        .unwrap_or_else(|| "An unknown error occurred".into())
}

/// libpulse refuses volumes above `Volume::MAX` by failing the request outright (the binding
/// panics on the null operation), so they are rejected before anything is sent.
fn checked_volume(volume: u32) -> Result<Volume, BridgeError> {
    let volume = Volume(volume);
    match volume.is_valid() {
        true => Ok(volume),
        false => Err(BridgeError::Rejected {
            op: "set volume request",
            reason: format!("volume {} is above the maximum of {}", volume.0, Volume::MAX.0),
        }),
    }
}
