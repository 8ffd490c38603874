//! Scripted rendering sessions for tests.

use crate::error::SessionError;
use crate::session::{RenderSession, SessionLauncher};
use crate::snapshot::ContentNode;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call made against a scripted session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    Wait(Duration),
    Snapshot,
    Advance,
    DismissConsent,
    Screenshot,
    Close,
}

/// Bytes a scripted session returns as its screenshot
pub const SCRIPTED_PNG: &[u8] = b"\x89PNG\r\n\x1a\nscripted";

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Session whose page grows by a scripted number of ads per scroll
pub struct ScriptedSession {
    growth: Box<dyn Fn(u32) -> usize + Send + Sync>,
    scrolls: u32,
    fail_navigation: bool,
    fail_snapshots: bool,
    fail_screenshots: bool,
    calls: CallLog,
}

impl ScriptedSession {
    /// `growth(scrolls)` is the number of ads rendered after that many scrolls
    pub fn growing(growth: impl Fn(u32) -> usize + Send + Sync + 'static) -> Self {
        Self {
            growth: Box::new(growth),
            scrolls: 0,
            fail_navigation: false,
            fail_snapshots: false,
            fail_screenshots: false,
            calls: CallLog::default(),
        }
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn failing_snapshots(mut self) -> Self {
        self.fail_snapshots = true;
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), SessionError> {
        self.record(Call::Navigate(url.to_string()));
        if self.fail_navigation {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {timeout_ms} ms"),
            });
        }
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        self.record(Call::Wait(duration));
    }

    async fn current_snapshot(&mut self) -> Result<ContentNode, SessionError> {
        self.record(Call::Snapshot);
        if self.fail_snapshots {
            return Err(SessionError::Command("page source unavailable".to_string()));
        }
        Ok(ad_page((self.growth)(self.scrolls)))
    }

    async fn advance_content(&mut self) -> Result<(), SessionError> {
        self.record(Call::Advance);
        self.scrolls += 1;
        Ok(())
    }

    async fn dismiss_consent_if_present(&mut self, _timeout_ms: u64) -> bool {
        self.record(Call::DismissConsent);
        false
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, SessionError> {
        self.record(Call::Screenshot);
        if self.fail_screenshots {
            return Err(SessionError::Command("no such window".to_string()));
        }
        Ok(SCRIPTED_PNG.to_vec())
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.record(Call::Close);
        Ok(())
    }
}

/// Launcher handing out one scripted session
pub struct ScriptedLauncher {
    session: Mutex<Option<ScriptedSession>>,
    calls: CallLog,
}

impl ScriptedLauncher {
    pub fn new(session: ScriptedSession) -> Self {
        let calls = session.calls();
        Self {
            session: Mutex::new(Some(session)),
            calls,
        }
    }

    /// Launcher that cannot reach a browser
    pub fn unavailable() -> Self {
        Self {
            session: Mutex::new(None),
            calls: CallLog::default(),
        }
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, SessionError> {
        let session = self.session.lock().unwrap().take();
        match session {
            Some(session) => Ok(Box::new(session)),
            None => Err(SessionError::Connect("connection refused".to_string())),
        }
    }
}

/// Library id of the n-th scripted ad
pub fn scripted_library_id(n: usize) -> String {
    format!("{}", 700_000_000_000_000u64 + n as u64)
}

/// A results page rendering `count` ads, each nested the way the library nests them
pub fn ad_page(count: usize) -> ContentNode {
    let mut page = ContentNode::default();
    let mut page_text = vec![format!("{count} resultados")];

    for n in 0..count {
        let id = scripted_library_id(n);
        let text = [
            format!("Anunciante Numero {n}"),
            "Activo".to_string(),
            format!("Identificador de la biblioteca: {id}"),
            "En circulación desde el 1 ene 2025".to_string(),
            "Oferta especial de temporada en todos nuestros productos".to_string(),
            "Ver detalles del anuncio".to_string(),
        ]
        .join("\n");
        let inner = ContentNode::new(text.clone());
        page_text.push(text.clone());
        page.children.push(ContentNode::new(text).with_child(inner));
    }

    page_text.push("Filtros ".repeat(400));
    page.text = page_text.join("\n");
    page
}
