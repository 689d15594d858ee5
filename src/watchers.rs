use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{Receiver, unbounded};

/// Watch a config file from a background thread. Every modify/create/remove
/// event sends `()`; the channel disconnects if the watcher cannot start.
pub fn spawn_config_watcher(path: PathBuf) -> Receiver<()> {
    let (tx, rx) = unbounded::<()>();
    std::thread::spawn(move || {
        use notify::{EventKind, RecursiveMode, Watcher};
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Modify(_)
                    | EventKind::Create(_)
                    | EventKind::Remove(_)
                    | EventKind::Any => {
                        let _ = tx.send(());
                    }
                    _ => {}
                }
            }
        });
        let mut watcher = match watcher {
            Ok(w) => w,
            Err(e) => {
                log::warn!("config watcher unavailable: {}", e);
                return;
            }
        };
        if let Err(e) = watcher.watch(path.as_path(), RecursiveMode::NonRecursive) {
            log::warn!("cannot watch {}: {}", path.display(), e);
            return;
        }
        log::info!("watching {}", path.display());
        loop {
            std::thread::sleep(Duration::from_secs(3600));
        }
    });
    rx
}
