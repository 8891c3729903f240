/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use std::fmt::{Display, Formatter};

/// A dialable address such as `SIP/100` or a bare extension `200`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndPoint {
    tech: Option<String>,
    name: String,
}

impl EndPoint {
    pub fn new(tech: &str, name: &str) -> Self {
        Self {
            tech: Some(tech.to_string()),
            name: name.to_string(),
        }
    }

    pub fn extension(name: &str) -> Self {
        Self {
            tech: None,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tech(&self) -> Option<&str> {
        self.tech.as_deref()
    }

    pub fn is_local(&self) -> bool {
        self.tech
            .as_deref()
            .is_some_and(|tech| tech.eq_ignore_ascii_case("local"))
    }

    pub fn full_name(&self) -> String {
        match &self.tech {
            Some(tech) => format!("{tech}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Display for EndPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId {
    pub name: String,
    pub number: String,
}

impl CallerId {
    pub fn new(name: &str, number: &str) -> Self {
        Self {
            name: name.to_string(),
            number: number.to_string(),
        }
    }
}

impl Display for CallerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" <{}>", self.name, self.number)
    }
}
