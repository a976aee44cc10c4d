//! One-shot hardware peripheral initialization.
//!
//! Configures the door-sensor ADC channel, the indicator LED outputs and
//! the CPU clock using raw ESP-IDF sys calls. Called once from `main()`
//! before the control loop starts.  The HX711 pins and the I²C bus are
//! owned through `esp-idf-hal` drivers instead and are not touched here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    PmConfigFailed(i32),
    UnsupportedCpuFreq(u16),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::PmConfigFailed(rc) => write!(f, "CPU frequency config failed (rc={})", rc),
            Self::UnsupportedCpuFreq(mhz) => write!(f, "unsupported CPU clock {} MHz", mhz),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        crate::error::Error::Init("peripheral init failed")
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── CPU clock ─────────────────────────────────────────────────

/// Clock steps the ESP32 PLL can run the CPU at.
pub const SUPPORTED_CPU_FREQS_MHZ: [u16; 3] = [80, 160, 240];

fn check_cpu_freq(mhz: u16) -> Result<(), HwInitError> {
    if SUPPORTED_CPU_FREQS_MHZ.contains(&mhz) {
        Ok(())
    } else {
        Err(HwInitError::UnsupportedCpuFreq(mhz))
    }
}

/// Pin the CPU at `mhz` (min = max, no light sleep).
///
/// Needs `CONFIG_PM_ENABLE=y` (set in `sdkconfig.defaults`); without it
/// `esp_pm_configure` returns `ESP_ERR_NOT_SUPPORTED`.
#[cfg(target_os = "espidf")]
pub fn set_cpu_freq_mhz(mhz: u16) -> Result<(), HwInitError> {
    check_cpu_freq(mhz)?;
    let cfg = esp_pm_config_t {
        max_freq_mhz: i32::from(mhz),
        min_freq_mhz: i32::from(mhz),
        light_sleep_enable: false,
    };
    // SAFETY: esp_pm_configure copies the config struct before returning.
    let ret = unsafe { esp_pm_configure(core::ptr::from_ref(&cfg).cast()) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::PmConfigFailed(ret));
    }
    info!("hw_init: CPU clock set to {} MHz", mhz);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn set_cpu_freq_mhz(mhz: u16) -> Result<(), HwInitError> {
    check_cpu_freq(mhz)?;
    log::info!("hw_init(sim): CPU clock {} MHz requested", mhz);
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  `init_adc()` completes before the control
/// loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation covers the full 0-3.3 V divider swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::LIGHT_SENSOR_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{}=door light, GPIO{})",
        pins::LIGHT_SENSOR_ADC_CHANNEL,
        pins::LIGHT_SENSOR_GPIO
    );
    Ok(())
}

/// One oneshot conversion.  A failed conversion reads as 0 (door closed).
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &[pins::WIFI_LED_GPIO, pins::CLOUD_LED_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: LED outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output configured in
    // init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

/// Simulated output levels, one bit per GPIO.
#[cfg(not(target_os = "espidf"))]
static SIM_GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    let bit = 1u64 << pin;
    if high {
        SIM_GPIO_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_GPIO_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    SIM_GPIO_LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
}
