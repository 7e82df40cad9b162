//! Attach / suspend / resume / detach sequencing against the mock chip.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use cs4270::registers::{
    REG_CHIPID, REG_FORMAT, REG_MODE, REG_MUTE, REG_PWRCTL, REG_TRANS, REG_VOLA, REG_VOLB,
};
use cs4270::{Control, ControlValue, Cs4270, Cs4270Config, Error, PowerState, SUPPLY_NAMES};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use platform::mocks::{EventLog, MockBusError, MockDelay, MockEvent, MockRegisterBus, MockSupplies};
use platform::{
    BulkSupplies, ClockRole, DaiFormat, GpioRail, HwParams, SampleFormat, SampleRateHz,
    SerialFormat,
};

type TestCodec = Cs4270<MockRegisterBus, MockSupplies, MockDelay>;

struct Rig {
    bus: MockRegisterBus,
    supplies: MockSupplies,
    delay: MockDelay,
    log: EventLog,
}

impl Rig {
    fn new(chip_id: u8) -> Self {
        let log = EventLog::new();
        Self {
            bus: MockRegisterBus::new()
                .with_register(REG_CHIPID, chip_id)
                .with_log(&log),
            supplies: MockSupplies::new().with_log(&log),
            delay: MockDelay::new().with_log(&log),
            log,
        }
    }

    fn attach(&self) -> Result<TestCodec, Error<MockBusError>> {
        Cs4270::attach(
            self.bus.clone(),
            self.supplies.clone(),
            self.delay.clone(),
            Cs4270Config::default(),
        )
    }
}

fn configure(codec: &mut TestCodec) {
    codec.set_sysclk(12_288_000).unwrap();
    codec
        .set_fmt(DaiFormat {
            format: SerialFormat::I2s,
            role: ClockRole::Master,
        })
        .unwrap();
    codec
        .hw_params(&HwParams {
            rate: SampleRateHz::new(96_000).unwrap(),
            channels: 2,
            sample_format: SampleFormat::S24Le,
        })
        .unwrap();
    codec
        .put_control(
            Control::PlaybackVolume,
            ControlValue::Stereo {
                left: 0xC0,
                right: 0xA0,
            },
        )
        .unwrap();
    codec
        .put_control(Control::Deemphasis, ControlValue::Switch(true))
        .unwrap();
    codec.digital_mute(false).unwrap();
}

const CONFIG_REGS: [u8; 7] = [
    REG_PWRCTL, REG_MODE, REG_FORMAT, REG_TRANS, REG_MUTE, REG_VOLA, REG_VOLB,
];

// ── Attach ───────────────────────────────────────────────────────────────────

#[test]
fn attach_with_wrong_signature_touches_no_rail() {
    let rig = Rig::new(0xA1);
    assert_eq!(
        rig.attach().err(),
        Some(Error::DeviceNotFound { chip_id: 0xA1 })
    );
    assert_eq!(rig.supplies.enable_calls(), 0);
    assert_eq!(rig.supplies.disable_calls(), 0);
    assert_eq!(rig.bus.writes(), 0);
}

#[test]
fn attach_bus_failure_on_identity_read_is_reported() {
    let rig = Rig::new(0xC0);
    rig.bus.fail_reads(true);
    assert_eq!(rig.attach().err(), Some(Error::Bus(MockBusError)));
    assert_eq!(rig.supplies.enable_calls(), 0);
}

#[test]
fn attach_applies_mute_and_transition_policy() {
    let rig = Rig::new(0xC1);
    let codec = rig.attach().unwrap();
    assert_eq!(codec.power_state(), PowerState::Active);
    assert_eq!(codec.revision(), 1);
    assert!(rig.supplies.is_enabled());
    // auto-mute off, soft ramp and zero cross off
    assert_eq!(rig.bus.register(REG_MUTE), 0x00);
    assert_eq!(rig.bus.register(REG_TRANS), 0x00);
}

#[test]
fn attach_orders_identity_rails_settle_policy() {
    let rig = Rig::new(0xC0);
    rig.attach().unwrap();
    assert_eq!(
        rig.log.events(),
        [
            MockEvent::Read(REG_CHIPID),
            MockEvent::SuppliesEnabled,
            MockEvent::DelayNs(500),
            MockEvent::Write(REG_MUTE, 0x00),
            MockEvent::Write(REG_TRANS, 0x00),
        ]
    );
}

#[test]
fn attach_rail_failure_aborts() {
    let rig = Rig::new(0xC0);
    rig.supplies.fail_enable(Some("vd"));
    assert_eq!(
        rig.attach().err(),
        Some(Error::SupplyUnavailable { rail: "vd" })
    );
    assert!(!rig.supplies.is_enabled());
    assert_eq!(rig.bus.writes(), 0);
}

#[test]
fn attach_policy_failure_switches_rails_back_off() {
    let rig = Rig::new(0xC0);
    rig.bus.fail_write_to(Some(REG_TRANS));
    assert_eq!(rig.attach().err(), Some(Error::Bus(MockBusError)));
    assert!(!rig.supplies.is_enabled());
    assert_eq!(rig.supplies.disable_calls(), 1);
}

// ── Suspend / resume ─────────────────────────────────────────────────────────

#[test]
fn suspend_resume_restores_every_configured_register() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    configure(&mut codec);
    let before: Vec<u8> = CONFIG_REGS.iter().map(|&r| rig.bus.register(r)).collect();

    codec.suspend().unwrap();
    rig.bus.power_cycle();
    rig.bus.set_register(REG_CHIPID, 0xC0);
    codec.resume().unwrap();

    let after: Vec<u8> = CONFIG_REGS.iter().map(|&r| rig.bus.register(r)).collect();
    assert_eq!(after, before);
    for &reg in &CONFIG_REGS {
        assert_eq!(codec.read_register(reg).unwrap(), rig.bus.register(reg));
    }
    assert_eq!(codec.power_state(), PowerState::Active);
}

#[test]
fn suspend_sets_power_down_bits_before_cutting_rails() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    rig.log.clear();
    codec.suspend().unwrap();
    assert_eq!(
        rig.log.events(),
        [MockEvent::Write(REG_PWRCTL, 0x23), MockEvent::SuppliesDisabled]
    );
    assert_eq!(codec.power_state(), PowerState::Suspended);
}

#[test]
fn failed_power_down_write_keeps_rails_on() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    rig.bus.fail_write_to(Some(REG_PWRCTL));
    assert_eq!(codec.suspend(), Err(Error::Bus(MockBusError)));
    assert!(rig.supplies.is_enabled());
    assert_eq!(rig.supplies.disable_calls(), 0);
    assert_eq!(codec.power_state(), PowerState::Active);
}

#[test]
fn resume_orders_rails_settle_sync_then_power_up() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    codec.suspend().unwrap();
    rig.log.clear();
    codec.resume().unwrap();

    let events = rig.log.events();
    let rails = rig.log.position(|e| *e == MockEvent::SuppliesEnabled).unwrap();
    let settle = rig.log.position(|e| matches!(e, MockEvent::DelayNs(_))).unwrap();
    let first_write = rig.log.position(|e| matches!(e, MockEvent::Write(..))).unwrap();
    assert!(rails < settle && settle < first_write);

    // full sync first (power-down still asserted), power-down cleared last
    assert_eq!(events[first_write], MockEvent::Write(REG_PWRCTL, 0x23));
    assert_eq!(events.last(), Some(&MockEvent::Write(REG_PWRCTL, 0x00)));
    let syncs = events
        .iter()
        .filter(|e| matches!(e, MockEvent::Write(..)))
        .count();
    assert_eq!(syncs, CONFIG_REGS.len() + 1);
}

#[test]
fn resume_uses_configured_settle_time() {
    let rig = Rig::new(0xC0);
    let mut codec = Cs4270::attach(
        rig.bus.clone(),
        rig.supplies.clone(),
        rig.delay.clone(),
        Cs4270Config { settle_ns: 5_000 },
    )
    .unwrap();
    codec.suspend().unwrap();
    rig.log.clear();
    codec.resume().unwrap();
    assert!(rig.log.events().contains(&MockEvent::DelayNs(5_000)));
}

#[test]
fn failed_resume_stays_suspended_and_can_retry() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    configure(&mut codec);
    codec.suspend().unwrap();

    rig.bus.fail_write_to(Some(REG_VOLA));
    assert_eq!(codec.resume(), Err(Error::Bus(MockBusError)));
    assert_eq!(codec.power_state(), PowerState::Suspended);
    assert!(!rig.supplies.is_enabled());

    rig.bus.fail_write_to(None);
    codec.resume().unwrap();
    assert_eq!(codec.power_state(), PowerState::Active);
    assert_eq!(rig.bus.register(REG_VOLA), 0x3F);
}

#[test]
fn resume_rail_failure_stays_suspended() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    codec.suspend().unwrap();
    rig.supplies.fail_enable(Some("va"));
    assert_eq!(
        codec.resume(),
        Err(Error::SupplyUnavailable { rail: "va" })
    );
    assert_eq!(codec.power_state(), PowerState::Suspended);
}

#[test]
fn controls_written_while_suspended_apply_on_resume() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    codec.suspend().unwrap();
    let writes = rig.bus.writes();

    codec
        .put_control(Control::SoftRamp, ControlValue::Switch(true))
        .unwrap();
    assert_eq!(rig.bus.writes(), writes);

    codec.resume().unwrap();
    assert_eq!(rig.bus.register(REG_TRANS), 0x40);
}

#[test]
fn chip_id_is_unreadable_while_suspended() {
    let rig = Rig::new(0xC1);
    let mut codec = rig.attach().unwrap();
    codec.suspend().unwrap();
    rig.bus.set_register(REG_CHIPID, 0xC3);
    let reads = rig.bus.reads();

    assert_eq!(
        codec.read_register(REG_CHIPID),
        Err(Error::PoweredDown { addr: REG_CHIPID })
    );
    assert_eq!(rig.bus.reads(), reads);

    codec.resume().unwrap();
    assert_eq!(codec.read_register(REG_CHIPID).unwrap(), 0xC3);
}

#[test]
fn illegal_transitions_are_rejected() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    assert_eq!(
        codec.resume(),
        Err(Error::InvalidState {
            state: PowerState::Active,
            operation: "resume"
        })
    );
    codec.suspend().unwrap();
    assert_eq!(
        codec.suspend(),
        Err(Error::InvalidState {
            state: PowerState::Suspended,
            operation: "suspend"
        })
    );
}

// ── Detach ───────────────────────────────────────────────────────────────────

#[test]
fn detach_releases_rails_and_blocks_everything() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    codec.detach().unwrap();
    assert!(!rig.supplies.is_enabled());
    assert_eq!(codec.power_state(), PowerState::Detached);

    let writes = rig.bus.writes();
    assert_eq!(codec.digital_mute(true), Err(Error::DeviceDetached));
    assert_eq!(codec.set_sysclk(12_288_000).err(), Some(Error::DeviceDetached));
    assert_eq!(codec.suspend(), Err(Error::DeviceDetached));
    assert_eq!(codec.resume(), Err(Error::DeviceDetached));
    assert_eq!(codec.detach(), Err(Error::DeviceDetached));
    assert_eq!(
        codec.get_control(Control::AutoMute).err(),
        Some(Error::DeviceDetached)
    );
    assert_eq!(rig.bus.writes(), writes);
}

#[test]
fn detach_from_suspended_does_not_switch_rails_again() {
    let rig = Rig::new(0xC0);
    let mut codec = rig.attach().unwrap();
    codec.suspend().unwrap();
    codec.detach().unwrap();
    assert_eq!(rig.supplies.disable_calls(), 1);
    let (_bus, supplies, _delay) = codec.release().ok().unwrap();
    assert!(!supplies.is_enabled());
}

// ── Board rails ──────────────────────────────────────────────────────────────

#[test]
fn gpio_rails_follow_attach_and_detach() {
    let pins: Vec<PinMock> = SUPPLY_NAMES
        .iter()
        .map(|_| {
            PinMock::new(&[
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
            ])
        })
        .collect();
    let rails = [0, 1, 2].map(|i| GpioRail::active_high(SUPPLY_NAMES[i], pins[i].clone()));
    let supplies = BulkSupplies::new(rails);
    assert!(supplies.names().eq(SUPPLY_NAMES));

    let bus = MockRegisterBus::new().with_register(REG_CHIPID, 0xC0);
    let mut codec = Cs4270::attach(bus, supplies, NoopDelay::new(), Cs4270Config::default())
        .unwrap();
    codec.detach().unwrap();
    let (_bus, _supplies, _delay) = codec.release().ok().unwrap();

    for mut pin in pins {
        pin.done();
    }
}
