//! SCSI Commands Module
//!
//! This module contains implementations of the SCSI commands the tool issues.

pub mod basic;
pub mod config;
