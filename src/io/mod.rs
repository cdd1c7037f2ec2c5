//
// Copyright 2017 yvt, all rights reserved.
//
// This source code is a part of Nightingales.
//
//! Codecs for the serialized map formats.
pub mod kv6;
pub mod vxl;
