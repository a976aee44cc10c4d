//! DoorScale Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink      IotHubClient         │
//! │  (Sensor+Indicator)     (EventSink)       (TelemetryTransport) │
//! │  WifiAdapter            Esp32TimeAdapter                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  TelemetryScheduler · device methods                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Ets;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use doorscale::adapters::hardware::HardwareAdapter;
use doorscale::adapters::iothub_mqtt::IotHubClient;
use doorscale::adapters::log_sink::LogEventSink;
use doorscale::adapters::time::{self, Esp32TimeAdapter};
use doorscale::adapters::wifi::WifiAdapter;
use doorscale::app::service::AppService;
use doorscale::config::{DeviceSecrets, SystemConfig};
use doorscale::drivers::hw_init;
use doorscale::drivers::hx711::Hx711;
use doorscale::drivers::status_led::StatusLed;
use doorscale::iothub::ConnectionString;
use doorscale::pins;
use doorscale::scheduler::SchedulerState;
use doorscale::sensors::door::DoorSensor;
use doorscale::sensors::kit::KitBoard;
use doorscale::sensors::load_cell::Scale;
use doorscale::sensors::SensorHub;

const SNTP_TIMEOUT: Duration = Duration::from_secs(30);
const HX711_PROBE_TIMEOUT_MS: u32 = 1_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DoorScale v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            error!("Invalid config ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    let secrets = DeviceSecrets::from_build_env();
    let clock = Esp32TimeAdapter::new();

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::set_cpu_freq_mhz(config.cpu_freq_mhz) {
        warn!("CPU clock unchanged: {}", e);
    }
    hw_init::init_peripherals()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // Load cell
    let sck = PinDriver::output(peripherals.pins.gpio13)?;
    let dout = PinDriver::input(peripherals.pins.gpio15)?;
    let mut hx711 = Hx711::new(sck, dout, Ets);
    hx711.power_up()?;
    info!(
        "Load cell on DOUT=GPIO{} SCK=GPIO{}",
        pins::LOADCELL_DOUT_GPIO,
        pins::LOADCELL_SCK_GPIO
    );

    let mut scale = Scale::new(hx711);
    scale.set_scale(config.load_cell_scale)?;
    if !scale.wait_ready_timeout(HX711_PROBE_TIMEOUT_MS, &mut Ets) {
        warn!("HX711 not found, weights will read 0");
    } else if let Err(e) = scale.tare(config.tare_samples) {
        warn!("Tare failed ({}), weights are not zeroed", e);
    }

    let sensor_hub = SensorHub::new(
        DoorSensor::new(config.door_light_threshold),
        scale,
        config.weight_samples,
    );

    // Kit board (optional)
    let kit = if config.kit_board_enabled {
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio25,
            peripherals.pins.gpio26,
            &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
        )?;
        match KitBoard::init(i2c) {
            Ok(board) => Some(board),
            Err(e) => {
                warn!("Kit board not responding ({}), continuing without it", e);
                None
            }
        }
    } else {
        None::<KitBoard<I2cDriver<'static>>>
    };

    let mut hw = HardwareAdapter::new(
        sensor_hub,
        kit,
        StatusLed::new(pins::WIFI_LED_GPIO),
        StatusLed::new(pins::CLOUD_LED_GPIO),
    );

    // ── 3. Wi-Fi ──────────────────────────────────────────────
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, Some(nvs))?;
    let has_wifi = wifi
        .set_credentials(secrets.wifi_ssid, secrets.wifi_password)
        .and_then(|()| wifi.connect(config.wifi_connect_attempts))
        .map_err(|e| error!("WiFi unavailable: {}", e))
        .is_ok();

    // ── 4. Clock + IoT Hub ────────────────────────────────────
    let mut _sntp = None;
    let mut hub = None;
    if has_wifi {
        match time::sync_clock(SNTP_TIMEOUT) {
            Ok(sntp) => _sntp = Some(sntp),
            Err(e) => warn!("Clock not synced: {}", e),
        }
        hub = ConnectionString::parse(secrets.connection_string)
            .and_then(|conn| IotHubClient::connect(&conn, config.sas_token_ttl_secs))
            .map_err(|e| error!("IoT Hub unavailable: {}", e))
            .ok();
    }
    let has_iothub = hub.is_some();

    // ── 5. App service ────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let state = SchedulerState::new(clock.uptime_ms(), has_wifi, has_iothub);
    let mut app = AppService::new(&config, state);
    app.start(&mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let loop_delay = Duration::from_millis(u64::from(config.loop_delay_ms));
    let mut offline = doorscale::app::ports::OfflineTransport;
    loop {
        let now_ms = clock.uptime_ms();
        match hub.as_mut() {
            Some(client) => app.run_iteration(now_ms, &mut hw, client, &mut log_sink),
            None => app.run_iteration(now_ms, &mut hw, &mut offline, &mut log_sink),
        };
        std::thread::sleep(loop_delay);
    }
}
