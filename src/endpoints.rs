//! Concrete endpoints of the Febos frontend API.
//!
//! One descriptor per operation, then one request struct per descriptor. Paths are
//! relative to the api prefix (see `crate::config::API_PATH`).

use http::Method;
use serde_json::Value;

use crate::auth::Credentials;
use crate::endpoint::{Endpoint, EndpointDescriptor};
use crate::error::{FebosError, Result};
use crate::models::febos::*;

const FBDEVLIST: &str = "/page/FBDEVLIST";

pub const LOGIN: EndpointDescriptor = EndpointDescriptor {
    name: "login",
    method: Method::POST,
    path: "/v1/auth/login",
    referer: "/auth/login",
    schema: "LoginPostResponse",
    authenticated: false,
};

pub const INSTALLATION: EndpointDescriptor = EndpointDescriptor {
    name: "installation",
    method: Method::GET,
    path: "/v1/installation",
    referer: "/auth/installation-list",
    schema: "InstallationGetResponse",
    authenticated: true,
};

pub const PAGE_CONFIG: EndpointDescriptor = EndpointDescriptor {
    name: "page-config",
    method: Method::GET,
    path: "/v1/installation/{installation_id}/page-config",
    referer: FBDEVLIST,
    schema: "PageConfigGetResponse",
    authenticated: true,
};

pub const REALTIME_DATA_GET: EndpointDescriptor = EndpointDescriptor {
    name: "realtime-data",
    method: Method::GET,
    path: "/v2/emmeti/{installation_id}/realtime-data",
    referer: FBDEVLIST,
    schema: "RealtimeDataGetResponse",
    authenticated: true,
};

pub const REALTIME_DATA_POST: EndpointDescriptor = EndpointDescriptor {
    name: "realtime-data-post",
    method: Method::POST,
    path: "/v2/emmeti/{installation_id}/realtime-data",
    referer: FBDEVLIST,
    schema: "RealtimeDataPostResponse",
    authenticated: true,
};

pub const GET_FEBOS_SLAVE: EndpointDescriptor = EndpointDescriptor {
    name: "get-febos-slave",
    method: Method::GET,
    path: "/v2/emmeti/{installation_id}/{device_id}/febos-data/get-febos-slave",
    referer: FBDEVLIST,
    schema: "GetFebosSlaveGetResponse",
    authenticated: true,
};

pub const GET_LANGUAGE: EndpointDescriptor = EndpointDescriptor {
    name: "get-language",
    method: Method::GET,
    path: "/v2/emmeti/{installation_id}/{device_id}/febos-data/get-language",
    referer: FBDEVLIST,
    schema: "GetLanguageGetResponse",
    authenticated: true,
};

pub const GET_DATA_ANALYSIS: EndpointDescriptor = EndpointDescriptor {
    name: "get-data-analysis",
    method: Method::GET,
    path: "/v2/emmeti/{installation_id}/{device_id}/febos-data/get-data-analysis",
    referer: FBDEVLIST,
    schema: "GetDataAnalysisGetResponse",
    authenticated: true,
};

pub const GET_HISTORICAL_DATA: EndpointDescriptor = EndpointDescriptor {
    name: "historical-data",
    method: Method::GET,
    path: "/v2/emmeti/{installation_id}/historical-data",
    referer: FBDEVLIST,
    schema: "HistoricalDataGetResponse",
    authenticated: true,
};

pub const ALL: [EndpointDescriptor; 9] = [
    LOGIN,
    INSTALLATION,
    PAGE_CONFIG,
    REALTIME_DATA_GET,
    REALTIME_DATA_POST,
    GET_FEBOS_SLAVE,
    GET_LANGUAGE,
    GET_DATA_ANALYSIS,
    GET_HISTORICAL_DATA,
];

fn non_empty(list: &[String], field: &'static str) -> Result<()> {
    if list.is_empty() {
        return Err(FebosError::EmptyInput { field });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoginEndpoint {
    pub credentials: Credentials,
}

impl Endpoint for LoginEndpoint {
    type Response = LoginPostResponse;
    const DESCRIPTOR: EndpointDescriptor = LOGIN;

    fn body(&self) -> Result<Option<Value>> {
        let body = serde_json::to_value(&self.credentials)
            .map_err(|e| FebosError::Authentication(format!("encoding credentials: {e}")))?;
        Ok(Some(body))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallationEndpoint {
    pub page_start: u64,
    pub page_items: u64,
}

impl Default for InstallationEndpoint {
    fn default() -> Self {
        InstallationEndpoint {
            page_start: 1,
            page_items: 500_000,
        }
    }
}

impl Endpoint for InstallationEndpoint {
    type Response = InstallationGetResponse;
    const DESCRIPTOR: EndpointDescriptor = INSTALLATION;

    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("pageStart".to_string(), self.page_start.to_string()),
            ("pageItems".to_string(), self.page_items.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfigEndpoint {
    pub installation_id: i64,
}

impl Endpoint for PageConfigEndpoint {
    type Response = PageConfigGetResponse;
    const DESCRIPTOR: EndpointDescriptor = PAGE_CONFIG;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("installation_id", self.installation_id.to_string())]
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("web".to_string(), "false".to_string())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeDataEndpoint {
    pub installation_id: i64,
    pub input_group_list: Vec<String>,
}

impl RealtimeDataEndpoint {
    fn joined_groups(&self) -> Vec<(String, String)> {
        vec![("input_group_list".to_string(), self.input_group_list.join(","))]
    }
}

impl Endpoint for RealtimeDataEndpoint {
    type Response = RealtimeDataGetResponse;
    const DESCRIPTOR: EndpointDescriptor = REALTIME_DATA_GET;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("installation_id", self.installation_id.to_string())]
    }

    fn query(&self) -> Vec<(String, String)> {
        self.joined_groups()
    }

    fn check(&self) -> Result<()> {
        non_empty(&self.input_group_list, "input_group_list")
    }
}

/// Write side of the real-time endpoint; the entry is sent with absent optionals
/// omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeDataPost<'a> {
    pub endpoint: &'a RealtimeDataEndpoint,
    pub data: &'a RealtimeData,
}

impl Endpoint for RealtimeDataPost<'_> {
    type Response = RealtimeDataPostResponse;
    const DESCRIPTOR: EndpointDescriptor = REALTIME_DATA_POST;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        self.endpoint.path_params()
    }

    fn query(&self) -> Vec<(String, String)> {
        self.endpoint.joined_groups()
    }

    fn body(&self) -> Result<Option<Value>> {
        let body = serde_json::to_value(self.data).map_err(|e| FebosError::Validation {
            entity: "RealtimeData",
            field: ".".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(body))
    }

    fn check(&self) -> Result<()> {
        self.endpoint.check()
    }
}

/// Path parameters shared by the `febos-data` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRef {
    pub installation_id: i64,
    pub device_id: i64,
}

impl DeviceRef {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("installation_id", self.installation_id.to_string()),
            ("device_id", self.device_id.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetFebosSlaveEndpoint(pub DeviceRef);

impl Endpoint for GetFebosSlaveEndpoint {
    type Response = GetFebosSlaveGetResponse;
    const DESCRIPTOR: EndpointDescriptor = GET_FEBOS_SLAVE;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        self.0.params()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetLanguageEndpoint(pub DeviceRef);

impl Endpoint for GetLanguageEndpoint {
    type Response = GetLanguageGetResponse;
    const DESCRIPTOR: EndpointDescriptor = GET_LANGUAGE;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        self.0.params()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDataAnalysisEndpoint {
    pub device: DeviceRef,
    pub from_ts: Option<String>,
    pub to_ts: Option<String>,
}

impl Endpoint for GetDataAnalysisEndpoint {
    type Response = GetDataAnalysisGetResponse;
    const DESCRIPTOR: EndpointDescriptor = GET_DATA_ANALYSIS;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        self.device.params()
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut q = Vec::new();
        if let Some(from) = &self.from_ts {
            q.push(("from".to_string(), from.clone()));
        }
        if let Some(to) = &self.to_ts {
            q.push(("to".to_string(), to.clone()));
        }
        q
    }
}

/// `input_group_list` is passed verbatim; the server accepts a single code here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetHistoricalDataEndpoint {
    pub installation_id: i64,
    pub input_group_list: String,
    pub time_from: String,
    pub time_to: String,
}

impl Endpoint for GetHistoricalDataEndpoint {
    type Response = HistoricalDataGetResponse;
    const DESCRIPTOR: EndpointDescriptor = GET_HISTORICAL_DATA;

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("installation_id", self.installation_id.to_string())]
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("input_group_list".to_string(), self.input_group_list.clone()),
            ("time_from".to_string(), self.time_from.clone()),
            ("time_to".to_string(), self.time_to.clone()),
        ]
    }
}
