//! Generator control, payload synthesis, and configuration for Pulse.
//!
//! This crate holds everything that does not depend on a transport: the
//! [`GeneratorController`] state machine, the pure payload synthesizer, the
//! capability traits the controller is wired through, the command surface
//! shared by REST and `WebSocket` clients, and YAML configuration.
//!
//! # Modules
//!
//! - [`command`] -- [`GeneratorCommand`] parsing, validation, and dispatch.
//! - [`config`] -- Configuration loading from `pulse-config.yaml`.
//! - [`controller`] -- The generator state machine and its timer.
//! - [`notify`] -- [`EventSink`] trait through which observers are notified.
//! - [`publish`] -- [`BrokerPublisher`] trait and [`PublishError`].
//! - [`synth`] -- Random payload synthesis.
//!
//! [`GeneratorController`]: controller::GeneratorController
//! [`GeneratorCommand`]: command::GeneratorCommand
//! [`EventSink`]: notify::EventSink
//! [`BrokerPublisher`]: publish::BrokerPublisher
//! [`PublishError`]: publish::PublishError

pub mod command;
pub mod config;
pub mod controller;
pub mod notify;
pub mod publish;
pub mod synth;
