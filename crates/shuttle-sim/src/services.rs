//! Session-wide services handed to every system alongside the world.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use shuttle_core::config::{EmergencyConfig, FtlConfig};
use shuttle_core::enums::AlertLevel;
use shuttle_core::events::{AudioEvent, Notice};

use crate::bus::EventBus;
use crate::joints::JointRegistry;
use crate::maps::MapManager;
use crate::portals::PortalRegistry;
use crate::staging::StagingMap;

pub struct Services {
    pub maps: MapManager,
    pub staging: StagingMap,
    pub joints: JointRegistry,
    pub portals: PortalRegistry,
    pub bus: EventBus,
    pub rng: ChaCha8Rng,
    pub ftl: FtlConfig,
    pub emergency: EmergencyConfig,
    /// Current tick, stamped onto announcements.
    pub tick: u64,
    pub audio_events: Vec<AudioEvent>,
    pub notices: Vec<Notice>,
}

impl Services {
    pub fn new(seed: u64, ftl: FtlConfig, emergency: EmergencyConfig) -> Self {
        Self {
            maps: MapManager::new(),
            staging: StagingMap::new(),
            joints: JointRegistry::new(),
            portals: PortalRegistry::new(),
            bus: EventBus::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            ftl,
            emergency,
            tick: 0,
            audio_events: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn popup(&mut self, console: u64, message: impl Into<String>) {
        self.notices.push(Notice::Popup {
            console,
            message: message.into(),
        });
    }

    pub fn announce(&mut self, level: AlertLevel, message: impl Into<String>) {
        let message = message.into();
        log::info!("announcement: {message}");
        self.notices.push(Notice::Announcement {
            level,
            message,
            tick: self.tick,
        });
    }

    /// Ask consoles on this grid to redraw, once per tick.
    pub fn refresh_consoles(&mut self, grid: u64) {
        let notice = Notice::ConsoleRefresh { grid };
        if !self.notices.contains(&notice) {
            self.notices.push(notice);
        }
    }
}
