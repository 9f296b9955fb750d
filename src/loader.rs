//! Background loading of typeface fonts.
//!
//! A load runs on a worker thread and hands its result back over a channel. The render
//! loop polls the returned [`FontLoad`] once per frame without blocking.

use crate::error::{Error, Result};
use crate::text::Font;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// Where the Helvetiker regular typeface is published.
pub const DEFAULT_FONT_URL: &str =
    "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json";

/// Where a typeface JSON document comes from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// Fetched with an HTTP GET.
    Url(String),
    /// Read from the local file system.
    File(PathBuf),
    /// Already in memory.
    Json(String),
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::Url(DEFAULT_FONT_URL.to_string())
    }
}

impl FontSource {
    /// Retrieves and parses the font. Blocks until done.
    pub fn fetch(&self) -> Result<Font> {
        let json = match self {
            FontSource::Url(url) => reqwest::blocking::get(url)?.error_for_status()?.text()?,
            FontSource::File(path) => fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
            FontSource::Json(json) => return Font::from_json(json),
        };

        Font::from_json(&json)
    }
}

/// Progress of a font load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// The font is still being fetched.
    Pending,
    /// The font was delivered by [`FontLoad::poll`].
    Resolved,
    /// The load failed. The error was delivered by [`FontLoad::poll`].
    Failed,
}

/// The sending half of a font load, owned by whoever produces the font.
pub struct FontSink {
    tx: Sender<Result<Font>>,
}

impl FontSink {
    /// Delivers the outcome of the load. Dropping the sink without calling this fails the load.
    pub fn send(self, result: Result<Font>) {
        // The receiving side may be gone already, nobody is waiting then.
        let _ = self.tx.send(result);
    }
}

/// The receiving half of a font load.
pub struct FontLoad {
    rx: Option<Receiver<Result<Font>>>,
    status: LoadStatus,
}

impl FontLoad {
    /// Creates a pending load and the sink that completes it.
    pub fn channel() -> (FontSink, FontLoad) {
        let (tx, rx) = mpsc::channel();
        let load = FontLoad {
            rx: Some(rx),
            status: LoadStatus::Pending,
        };
        (FontSink { tx }, load)
    }

    /// Starts loading the font from `source`.
    ///
    /// In-memory sources are parsed immediately, the others on a worker thread.
    pub fn start(source: FontSource) -> FontLoad {
        let (sink, load) = FontLoad::channel();

        if let FontSource::Json(_) = &source {
            sink.send(source.fetch());
            return load;
        }

        log::info!("Loading font from {:?}.", source);
        let spawned = thread::Builder::new()
            .name("font-loader".to_string())
            .spawn(move || sink.send(source.fetch()));

        if let Err(e) = spawned {
            // The sink was dropped with the closure, so the load reports a failure.
            log::error!("Could not start the font loader thread: {}", e);
        }

        load
    }

    /// The current status of the load.
    #[inline]
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Returns the outcome of the load if it just completed.
    ///
    /// Never blocks. The outcome is returned exactly once, later calls return `None`.
    pub fn poll(&mut self) -> Option<Result<Font>> {
        let rx = self.rx.as_ref()?;

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Error::LoaderDisconnected),
        };

        self.rx = None;
        self.status = if result.is_ok() {
            LoadStatus::Resolved
        } else {
            LoadStatus::Failed
        };

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FONT: &str = r#"{
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": 0, "yMax": 1000 },
        "glyphs": { "I": { "ha": 300, "o": "m 0 0 l 0 700 l 200 700 l 200 0" } }
    }"#;

    fn wait(load: &mut FontLoad) -> Result<Font> {
        for _ in 0..500 {
            if let Some(result) = load.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("font load did not complete");
    }

    #[test]
    fn pending_until_sent() {
        let (sink, mut load) = FontLoad::channel();
        assert!(load.poll().is_none());
        assert_eq!(load.status(), LoadStatus::Pending);

        sink.send(Font::from_json(FONT));
        assert!(load.poll().unwrap().is_ok());
        assert_eq!(load.status(), LoadStatus::Resolved);

        // Delivered once.
        assert!(load.poll().is_none());
        assert_eq!(load.status(), LoadStatus::Resolved);
    }

    #[test]
    fn dropped_sink_fails_the_load() {
        let (sink, mut load) = FontLoad::channel();
        drop(sink);

        assert!(matches!(load.poll(), Some(Err(Error::LoaderDisconnected))));
        assert_eq!(load.status(), LoadStatus::Failed);
    }

    #[test]
    fn inline_json_resolves_immediately() {
        let mut load = FontLoad::start(FontSource::Json(FONT.to_string()));
        let font = load.poll().unwrap().unwrap();
        assert_eq!(font.glyphs.len(), 1);
    }

    #[test]
    fn missing_file_fails_on_worker() {
        let path = PathBuf::from("does/not/exist.typeface.json");
        let mut load = FontLoad::start(FontSource::File(path.clone()));

        match wait(&mut load) {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected outcome: {:?}", other.map(|f| f.family_name)),
        }
        assert_eq!(load.status(), LoadStatus::Failed);
    }

    #[test]
    fn file_is_loaded_on_worker() {
        let path = std::env::temp_dir().join(format!("wip3d-font-{}.json", std::process::id()));
        fs::write(&path, FONT).unwrap();

        let mut load = FontLoad::start(FontSource::File(path.clone()));
        let font = wait(&mut load).unwrap();
        assert!(font.glyph('I').is_some());

        let _ = fs::remove_file(path);
    }
}
