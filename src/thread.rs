/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! `HostThread`: a dedicated UI-role thread that owns a [`BrowserHost`].

use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use log::debug;

use crate::handle::BrowserHandle;
use crate::host::BrowserHost;
use crate::types::{FrameId, HostError, ProcessId, ProcessMessage, lock};

type Task = Box<dyn FnOnce(&mut BrowserHost) + Send>;

/// Commands sent from the `HostThread` handle to the UI thread.
enum Command {
    LoadUrl {
        frame_id: FrameId,
        url: String,
        response: mpsc::Sender<Result<(), HostError>>,
    },
    SendProcessMessage {
        target: ProcessId,
        message: ProcessMessage,
        response: mpsc::Sender<bool>,
    },
    CloseBrowser {
        force: bool,
        response: mpsc::Sender<()>,
    },
    ZoomLevel {
        response: mpsc::Sender<f64>,
    },
    SetZoomLevel {
        level: f64,
        response: mpsc::Sender<bool>,
    },
    Post(Task),
    Shutdown,
}

/// Thread-safe owner of a browser host. `Send + Sync`.
///
/// The host and its collaborators are built on the UI thread by the factory
/// passed to [`HostThread::spawn`] and never leave it; callers talk to it
/// through channels. Client callbacks run on that thread, and a callback
/// that needs the host again should [`post`](Self::post) a task.
pub struct HostThread {
    sender: Mutex<mpsc::Sender<Command>>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    handle: BrowserHandle,
}

impl HostThread {
    /// Starts the UI thread and creates the host on it.
    pub fn spawn<F>(factory: F) -> Result<Self, HostError>
    where
        F: FnOnce() -> Result<BrowserHost, HostError> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = mpsc::channel::<Result<BrowserHandle, HostError>>();

        let thread = thread::Builder::new()
            .name("browser-ui".into())
            .spawn(move || {
                let mut host = match factory() {
                    Ok(host) => {
                        let _ = init_tx.send(Ok(host.handle().clone()));
                        host
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::LoadUrl {
                            frame_id,
                            url,
                            response,
                        } => {
                            let _ = response.send(host.load_url(frame_id, &url));
                        }
                        Command::SendProcessMessage {
                            target,
                            message,
                            response,
                        } => {
                            let _ = response.send(host.send_process_message(target, message));
                        }
                        Command::CloseBrowser { force, response } => {
                            host.close_browser(force);
                            let _ = response.send(());
                        }
                        Command::ZoomLevel { response } => {
                            let _ = response.send(host.zoom_level());
                        }
                        Command::SetZoomLevel { level, response } => {
                            let _ = response.send(host.set_zoom_level(level));
                        }
                        Command::Post(task) => task(&mut host),
                        Command::Shutdown => break,
                    }
                }
                debug!("browser {} UI thread exiting", host.browser_id());
            })
            .map_err(|e| HostError::InitFailed(e.to_string()))?;

        let handle = init_rx
            .recv()
            .map_err(|_| HostError::InitFailed("UI thread panicked".into()))??;

        Ok(Self {
            sender: Mutex::new(cmd_tx),
            thread: Mutex::new(Some(thread)),
            handle,
        })
    }

    /// Cross-role view of the hosted browser.
    pub fn handle(&self) -> &BrowserHandle {
        &self.handle
    }

    fn send(&self, cmd: Command) -> Result<(), HostError> {
        lock(&self.sender)
            .send(cmd)
            .map_err(|_| HostError::ChannelClosed)
    }

    fn send_cmd<T>(
        &self,
        make_cmd: impl FnOnce(mpsc::Sender<T>) -> Command,
    ) -> Result<T, HostError> {
        let (resp_tx, resp_rx) = mpsc::channel();
        self.send(make_cmd(resp_tx))?;
        resp_rx.recv().map_err(|_| HostError::ChannelClosed)
    }

    pub fn load_url(&self, frame_id: FrameId, url: &str) -> Result<(), HostError> {
        self.send_cmd(|response| Command::LoadUrl {
            frame_id,
            url: url.to_string(),
            response,
        })?
    }

    pub fn send_process_message(
        &self,
        target: ProcessId,
        message: ProcessMessage,
    ) -> Result<bool, HostError> {
        self.send_cmd(|response| Command::SendProcessMessage {
            target,
            message,
            response,
        })
    }

    pub fn close_browser(&self, force: bool) -> Result<(), HostError> {
        self.send_cmd(|response| Command::CloseBrowser { force, response })
    }

    pub fn zoom_level(&self) -> Result<f64, HostError> {
        self.send_cmd(|response| Command::ZoomLevel { response })
    }

    pub fn set_zoom_level(&self, level: f64) -> Result<bool, HostError> {
        self.send_cmd(|response| Command::SetZoomLevel { level, response })
    }

    /// Runs `task` on the UI thread later, without waiting.
    pub fn post(
        &self,
        task: impl FnOnce(&mut BrowserHost) + Send + 'static,
    ) -> Result<(), HostError> {
        self.send(Command::Post(Box::new(task)))
    }

    /// Runs `task` on the UI thread and waits for its result.
    pub fn invoke<T: Send + 'static>(
        &self,
        task: impl FnOnce(&mut BrowserHost) -> T + Send + 'static,
    ) -> Result<T, HostError> {
        self.send_cmd(|response| {
            Command::Post(Box::new(move |host| {
                let _ = response.send(task(host));
            }))
        })
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        let _ = self.send(Command::Shutdown);
        if let Some(thread) = lock(&self.thread).take() {
            let _ = thread.join();
        }
    }
}
