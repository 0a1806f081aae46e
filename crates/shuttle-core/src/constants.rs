//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Grids ---

/// Edge length of one grid tile.
pub const TILE_SIZE: f32 = 1.0;

/// Mass contributed by each tile to its grid's body.
pub const TILE_MASS: f32 = 25.0;

/// Linear damping of a shuttle outside FTL.
pub const SHUTTLE_LINEAR_DAMPING: f32 = 0.05;

/// Angular damping of a shuttle outside FTL.
pub const SHUTTLE_ANGULAR_DAMPING: f32 = 0.05;

/// Shrink applied to tile boxes before overlap tests so that flush edges
/// do not count as overlap.
pub const GRID_OVERLAP_EPSILON: f32 = 0.01;

// --- Docking ---

/// Name of the sensor fixture a docking port creates while enabled.
pub const DOCKING_FIXTURE: &str = "docking";

/// Joint id prefix for dock welds.
pub const DOCKING_JOINT: &str = "docking";

/// Radius of the docking fixture.
pub const DOCKING_RADIUS: f32 = 0.2;

/// Weld joint spring frequency (Hz).
pub const DOCK_JOINT_FREQUENCY: f32 = 2.0;

/// Weld joint damping ratio.
pub const DOCK_JOINT_DAMPING_RATIO: f32 = 0.7;

/// Ports stay `RecentlyDocked` until they separate beyond this distance.
pub const RECENTLY_DOCKED_RADIUS: f32 = 1.5;

/// Decimal digits used when comparing candidate dock placements.
pub const DOCK_MATCH_DECIMALS: i32 = 2;

/// Priority tag of the emergency shuttle's preferred station ports.
pub const DOCK_TAG_EMERGENCY: &str = "DockEmergency";

/// Priority tag of the arrivals shuttle's preferred station ports.
pub const DOCK_TAG_ARRIVALS: &str = "DockArrivals";

// --- FTL ---

/// Default spin-up before leaving the origin map (seconds).
pub const DEFAULT_STARTUP_SECS: f32 = 5.5;

/// Default total travel time, including the arrival lead (seconds).
pub const DEFAULT_TRAVEL_SECS: f32 = 30.0;

/// How long before arrival the shuttle starts braking (seconds).
pub const ARRIVAL_LEAD_SECS: f32 = 5.0;

/// Drive lockout after arrival (seconds).
pub const FTL_COOLDOWN_SECS: f32 = 30.0;

/// Forward speed while parked on the staging map.
pub const FTL_CRUISE_SPEED: f32 = 20.0;

/// Gap between shuttles packed side by side on the staging map.
pub const STAGING_BUFFER: f32 = 5.0;

/// How far around a shuttle other heavy grids block an FTL start.
pub const FTL_RANGE: f32 = 100.0;

/// Minimum mass a nearby grid needs to block an FTL start.
pub const FTL_MASS_THRESHOLD: f32 = 300.0;

/// Grids heavier than this become FTL destinations when added to a station.
pub const FTL_DESTINATION_MASS: f32 = 500.0;

/// Expansion rounds of the proximity search before going map-wide.
pub const FTL_PROXIMITY_ITERATIONS: u32 = 3;

/// Extra random spread beyond the minimum proximity radius.
pub const PROXIMITY_SPAWN_SPREAD: f32 = 64.0;

/// Random spawn points tried before settling for the last one.
pub const PROXIMITY_SPAWN_ATTEMPTS: usize = 8;

/// Knockdown duration for unbuckled occupants at departure and arrival.
pub const KNOCKDOWN_SECS: f32 = 5.0;

/// Speed at which occupants standing over open tiles are thrown out.
pub const VENT_THROW_SPEED: f32 = 8.0;

/// Margin added around each hard fixture box when flattening an arrival.
pub const FLATTEN_MARGIN: f32 = 0.05;

/// Number of remains a gibbed body produces.
pub const GIB_REMAINS: usize = 3;

/// Sound range padding on top of the grid's largest dimension.
pub const SOUND_RANGE_PADDING: f32 = 12.5;

/// Sound range for anything that is not a grid.
pub const SOUND_RANGE_DEFAULT: f32 = 4.0;

// --- Emergency shuttle ---

/// Countdown left once early launch is authorized (seconds).
pub const EMERGENCY_AUTHORIZE_SECS: f32 = 10.0;

/// How long the emergency shuttle waits docked before leaving (seconds).
pub const EMERGENCY_DOCKED_SECS: f32 = 180.0;

/// Shortest trip from the station to central command (seconds).
pub const EMERGENCY_MIN_TRANSIT_SECS: f32 = 60.0;

/// Longest trip from the station to central command (seconds).
pub const EMERGENCY_MAX_TRANSIT_SECS: f32 = 180.0;

/// Card holders needed to authorize an early launch.
pub const EMERGENCY_AUTHORIZATIONS_REQUIRED: usize = 3;

/// Access tag needed to authorize or repeal at an emergency console.
pub const ACCESS_COMMAND: &str = "Command";

/// Access tag needed to withdraw every authorization at once.
pub const ACCESS_REPEAL_ALL: &str = "EmergencyShuttleRepealAll";
