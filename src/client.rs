//! HTTP client for the Febos frontend API.
//!
//! - Blocking; the network half lives behind `crate::transport::Transport`.
//! - One method per endpoint in `crate::endpoints`, all going through `send`.
//!
//! Authentication
//! - `login` posts credentials and stores the `Authorization` response header as the
//!   bearer token. Every other endpoint refuses to run until a token is set.
//! - No refresh and no retry: a 401 surfaces as `FebosError::HttpStatus`.

use http::header::{ACCEPT, CONTENT_TYPE, REFERER};
use http::{HeaderMap, HeaderValue, Method};
use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::auth::{BearerAuth, Credentials};
use crate::config::{API_PATH, APP_PATH, ClientConfig};
use crate::endpoint::{Endpoint, EndpointDescriptor, bind_path};
use crate::endpoints::*;
use crate::error::{FebosError, Result};
use crate::models::febos::*;
use crate::schema;
use crate::transport::{HttpRequest, HttpResponse, Transport, UreqTransport};

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const JSON: &str = "application/json";

pub struct FebosClient<T = UreqTransport> {
    transport: T,
    base_url: String,
    auth: BearerAuth,
}

impl FebosClient<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config.base_url.clone(), UreqTransport::new(config.timeout))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&ClientConfig::from_env()?))
    }
}

impl<T: Transport> FebosClient<T> {
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        FebosClient {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: BearerAuth::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_token(&self) -> Option<String> {
        self.auth.get_token()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.auth.set_token(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.has_token()
    }

    /// Compose and issue one request for `descriptor`.
    ///
    /// Headers are built in order: `Accept`, `Referer`, `Content-Type` for POST, then
    /// `extra_headers` (replacing any same-named header), then the bearer token.
    /// Returns the raw response on a 2xx status and `HttpStatus` otherwise.
    pub fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        path_params: &[(&str, String)],
        extra_headers: Option<&HeaderMap>,
        query: Vec<(String, String)>,
        body: Option<JsonValue>,
    ) -> Result<HttpResponse> {
        let path = bind_path(descriptor.path, path_params)?;
        let url = format!("{}{}{}", self.base_url, API_PATH, path);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        let referer = format!("{}{}{}", self.base_url, APP_PATH, descriptor.referer);
        let referer = HeaderValue::from_str(&referer)
            .map_err(|e| FebosError::Config(format!("base url is not a valid Referer value: {e}")))?;
        headers.insert(REFERER, referer);
        if descriptor.method == Method::POST {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        if let Some(extra) = extra_headers {
            for name in extra.keys() {
                headers.remove(name);
            }
            for (name, value) in extra {
                headers.append(name.clone(), value.clone());
            }
        }
        self.auth.decorate(&mut headers)?;

        let request = HttpRequest {
            method: descriptor.method.clone(),
            url,
            headers,
            query,
            body,
        };
        let response = self.transport.request(&request)?;
        if !response.is_success() {
            warn!("{} returned http {}", descriptor.name, response.status);
            return Err(FebosError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// Run argument checks and the token gate, then `execute` the endpoint.
    pub fn send<E: Endpoint>(&self, endpoint: &E, extra_headers: Option<&HeaderMap>) -> Result<HttpResponse> {
        endpoint.check()?;
        if E::DESCRIPTOR.authenticated && !self.auth.has_token() {
            return Err(FebosError::NotAuthenticated {
                endpoint: E::DESCRIPTOR.name,
            });
        }
        self.execute(
            &E::DESCRIPTOR,
            &endpoint.path_params(),
            extra_headers,
            endpoint.query(),
            endpoint.body()?,
        )
    }

    pub fn call<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response> {
        let response = self.send(endpoint, None)?;
        Self::decode::<E>(&response)
    }

    fn decode<E: Endpoint>(response: &HttpResponse) -> Result<E::Response> {
        schema::validate::<E::Response>(E::DESCRIPTOR.schema, &response.body)
            .inspect_err(|e| warn!("{} response rejected: {}", E::DESCRIPTOR.name, e))
    }

    /// Authenticate and store the returned token. The token is stored only once the
    /// profile body has validated.
    pub fn login(&self, credentials: &Credentials) -> Result<LoginPostResponse> {
        let endpoint = LoginEndpoint {
            credentials: credentials.clone(),
        };
        let response = match self.send(&endpoint, None) {
            Ok(r) => r,
            Err(FebosError::HttpStatus { status, body }) => {
                return Err(FebosError::Authentication(format!("http {status}: {body}")));
            }
            Err(e) => return Err(e),
        };

        let token = response
            .header("Authorization")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FebosError::Authentication("missing authorization token in response".to_string()))?
            .to_string();
        let profile = Self::decode::<LoginEndpoint>(&response)?;

        self.auth.set_token(token);
        info!(
            "Logged in as {} ({} installation(s))",
            profile.username,
            profile.installation_id_list.len()
        );
        Ok(profile)
    }

    pub fn installations(&self, page_start: u64, page_items: u64) -> Result<InstallationGetResponse> {
        self.call(&InstallationEndpoint { page_start, page_items })
    }

    pub fn page_config(&self, installation_id: i64) -> Result<PageConfigGetResponse> {
        self.call(&PageConfigEndpoint { installation_id })
    }

    pub fn realtime_data<I, S>(&self, installation_id: i64, input_group_list: I) -> Result<RealtimeDataGetResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.call(&RealtimeDataEndpoint {
            installation_id,
            input_group_list: input_group_list.into_iter().map(Into::into).collect(),
        })
    }

    pub fn post_realtime_data<I, S>(
        &self,
        installation_id: i64,
        input_group_list: I,
        data: &RealtimeData,
    ) -> Result<RealtimeDataPostResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoint = RealtimeDataEndpoint {
            installation_id,
            input_group_list: input_group_list.into_iter().map(Into::into).collect(),
        };
        self.call(&RealtimeDataPost {
            endpoint: &endpoint,
            data,
        })
    }

    pub fn febos_slaves(&self, installation_id: i64, device_id: i64) -> Result<GetFebosSlaveGetResponse> {
        self.call(&GetFebosSlaveEndpoint(DeviceRef {
            installation_id,
            device_id,
        }))
    }

    pub fn language(&self, installation_id: i64, device_id: i64) -> Result<GetLanguageGetResponse> {
        self.call(&GetLanguageEndpoint(DeviceRef {
            installation_id,
            device_id,
        }))
    }

    pub fn data_analysis(
        &self,
        installation_id: i64,
        device_id: i64,
        from_ts: Option<&str>,
        to_ts: Option<&str>,
    ) -> Result<GetDataAnalysisGetResponse> {
        self.call(&GetDataAnalysisEndpoint {
            device: DeviceRef {
                installation_id,
                device_id,
            },
            from_ts: from_ts.map(str::to_string),
            to_ts: to_ts.map(str::to_string),
        })
    }

    pub fn historical_data(
        &self,
        installation_id: i64,
        input_group_list: &str,
        time_from: &str,
        time_to: &str,
    ) -> Result<HistoricalDataGetResponse> {
        self.call(&GetHistoricalDataEndpoint {
            installation_id,
            input_group_list: input_group_list.to_string(),
            time_from: time_from.to_string(),
            time_to: time_to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use http::header::AUTHORIZATION;
    use indexmap::IndexMap;
    use serde_json::json;

    const BASE: &str = "https://example.test";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/data/{name}")).expect("fixture present")
    }

    fn client() -> FebosClient<FakeTransport> {
        FebosClient::with_transport(BASE, FakeTransport::new())
    }

    fn authed() -> FebosClient<FakeTransport> {
        let c = client();
        c.set_token("fake-token");
        c
    }

    fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
        req.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn login_stores_token_and_later_requests_carry_it() {
        let c = client();
        c.transport()
            .push_with_headers(200, &[("Authorization", "abc123")], fixture("login.json"));
        c.transport().push(200, r#"{"ts":"2026-02-11 22:02:50","ID_language":"1"}"#);

        let profile = c.login(&Credentials::new("testuser", "password123")).unwrap();
        assert_eq!(profile.username, "testuser");
        assert_eq!(profile.installation_id_list, vec![100]);
        assert_eq!(c.get_token().as_deref(), Some("abc123"));

        let login_req = &c.transport().requests()[0];
        assert_eq!(login_req.method, Method::POST);
        assert_eq!(login_req.url, format!("{BASE}/aq-iot-server-frontend-ha/api/v1/auth/login"));
        assert_eq!(header(login_req, "Referer"), Some("https://example.test/aq-iot-app-emmeti/auth/login"));
        assert_eq!(header(login_req, "Content-Type"), Some("application/json"));
        assert_eq!(header(login_req, "Accept"), Some("application/json, text/plain, */*"));
        assert!(login_req.headers.get(AUTHORIZATION).is_none());
        assert_eq!(
            login_req.body,
            Some(json!({"username": "testuser", "password": "password123"}))
        );

        c.language(100, 789).unwrap();
        assert_eq!(header(&c.transport().last(), "Authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn login_without_token_header_fails_and_leaves_token_unset() {
        let c = client();
        c.transport().push(200, fixture("login.json"));
        let err = c.login(&Credentials::new("user", "pass")).unwrap_err();
        match err {
            FebosError::Authentication(msg) => assert!(msg.contains("missing authorization token")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.get_token(), None);
        assert!(!c.is_authenticated());
    }

    #[test]
    fn login_rejected_is_authentication_error_without_retry() {
        let c = client();
        c.transport().push(401, "bad credentials");
        let err = c.login(&Credentials::new("wrong", "wrong")).unwrap_err();
        match err {
            FebosError::Authentication(msg) => assert_eq!(msg, "http 401: bad credentials"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.transport().calls(), 1);
        assert_eq!(c.get_token(), None);
    }

    #[test]
    fn login_with_invalid_profile_does_not_store_token() {
        let c = client();
        c.transport()
            .push_with_headers(200, &[("Authorization", "abc123")], r#"{"username":"x"}"#);
        assert!(matches!(
            c.login(&Credentials::new("x", "y")),
            Err(FebosError::Validation { entity: "LoginPostResponse", .. })
        ));
        assert_eq!(c.get_token(), None);
    }

    #[test]
    fn new_login_overwrites_token() {
        let c = authed();
        c.transport()
            .push_with_headers(200, &[("Authorization", "second")], fixture("login.json"));
        c.login(&Credentials::new("testuser", "p")).unwrap();
        assert_eq!(c.get_token().as_deref(), Some("second"));
    }

    #[test]
    fn unauthorized_is_http_status_error_without_retry() {
        let c = authed();
        c.transport().push(401, "expired");
        let err = c.realtime_data(100, ["GR1", "GR2"]).unwrap_err();
        assert_eq!(err.status(), Some(401));
        match err {
            FebosError::HttpStatus { body, .. } => assert_eq!(body, "expired"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.transport().calls(), 1);
    }

    #[test]
    fn protected_endpoints_need_login_first() {
        let c = client();
        assert!(matches!(
            c.installations(1, 500_000),
            Err(FebosError::NotAuthenticated { endpoint: "installation" })
        ));
        assert!(matches!(c.page_config(100), Err(FebosError::NotAuthenticated { .. })));
        assert!(matches!(c.language(100, 789), Err(FebosError::NotAuthenticated { .. })));
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn empty_group_list_fails_before_any_request() {
        let c = authed();
        let groups: Vec<String> = Vec::new();
        assert!(matches!(
            c.realtime_data(100, groups.clone()),
            Err(FebosError::EmptyInput { field: "input_group_list" })
        ));
        let entry = RealtimeData::new(789, 10, IndexMap::new());
        assert!(matches!(
            c.post_realtime_data(100, groups, &entry),
            Err(FebosError::EmptyInput { .. })
        ));
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn unbound_placeholder_fails_before_any_request() {
        let c = authed();
        let err = c.execute(&GET_LANGUAGE, &[("installation_id", "100".to_string())], None, Vec::new(), None);
        assert!(matches!(err, Err(FebosError::TemplateBinding { placeholder, .. }) if placeholder == "device_id"));
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn get_language_end_to_end() {
        let c = authed();
        c.transport().push_json(&json!({"ts": "2026-02-11 22:02:50", "ID_language": "1"}));
        let lang = c.language(100, 789).unwrap();
        assert_eq!(
            lang,
            GetLanguageGetResponse {
                ts: "2026-02-11 22:02:50".to_string(),
                id_language: "1".to_string(),
            }
        );

        let req = c.transport().last();
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.url,
            "https://example.test/aq-iot-server-frontend-ha/api/v2/emmeti/100/789/febos-data/get-language"
        );
        assert_eq!(header(&req, "Referer"), Some("https://example.test/aq-iot-app-emmeti/page/FBDEVLIST"));
        assert!(req.headers.get(CONTENT_TYPE).is_none());
        assert!(req.query.is_empty());
        assert_eq!(req.body, None);
    }

    #[test]
    fn installation_sends_paging_query() {
        let c = authed();
        c.transport().push(200, fixture("installation.json"));
        let list = c.installations(1, 500_000).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].final_user_id, Some(vec![10, 11]));

        let req = c.transport().last();
        assert_eq!(req.url, format!("{BASE}/aq-iot-server-frontend-ha/api/v1/installation"));
        assert_eq!(
            header(&req, "Referer"),
            Some("https://example.test/aq-iot-app-emmeti/auth/installation-list")
        );
        assert_eq!(
            req.query,
            vec![
                ("pageStart".to_string(), "1".to_string()),
                ("pageItems".to_string(), "500000".to_string())
            ]
        );
    }

    #[test]
    fn page_config_is_requested_for_app_view() {
        let c = authed();
        c.transport().push(200, fixture("page-config.json"));
        let cfg = c.page_config(100).unwrap();
        assert_eq!(cfg.device_map["789"].installation_id, 100);

        let req = c.transport().last();
        assert!(req.url.ends_with("/v1/installation/100/page-config"));
        assert_eq!(req.query, vec![("web".to_string(), "false".to_string())]);
    }

    #[test]
    fn realtime_get_joins_groups_and_keeps_untyped_values() {
        let c = authed();
        c.transport().push(200, fixture("realtime-data.json"));
        let data = c.realtime_data(100, ["GR1", "GR2"]).unwrap();
        assert_eq!(data[0].data["R8750"].i, json!(22.5));
        assert_eq!(data[0].data["T_AMB"].i, json!("215"));
        assert_eq!(data[0].group_code.as_deref(), Some("F_GENERAL"));

        let req = c.transport().last();
        assert!(req.url.ends_with("/v2/emmeti/100/realtime-data"));
        assert_eq!(req.query, vec![("input_group_list".to_string(), "GR1,GR2".to_string())]);
    }

    #[test]
    fn realtime_post_strips_absent_optionals_and_round_trips() {
        let c = authed();
        c.transport().push_json(&json!({"errCode": 0, "msg": "OK"}));

        let mut values = IndexMap::new();
        values.insert("R8750".to_string(), Value::new(215));
        values.insert("MODE".to_string(), Value::new("AUTO"));
        let entry = RealtimeData::new(789, 31115, values);

        let res = c.post_realtime_data(100, ["F_GENERAL@D789@T31115"], &entry).unwrap();
        assert_eq!(res.err_code, 0);

        let req = c.transport().last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(header(&req, "Content-Type"), Some("application/json"));
        assert_eq!(header(&req, "Authorization"), Some("Bearer fake-token"));
        assert_eq!(
            req.query,
            vec![("input_group_list".to_string(), "F_GENERAL@D789@T31115".to_string())]
        );

        let body = req.body.expect("post carries a body");
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("groupCode"));
        assert!(obj.values().all(|v| !v.is_null()));

        let back: RealtimeData = schema::validate_value("RealtimeData", body).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn extra_headers_override_defaults_but_not_auth() {
        let c = authed();
        c.transport().push(200, "[]");
        let mut extra = HeaderMap::new();
        extra.insert(ACCEPT, HeaderValue::from_static("application/json"));
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        extra.insert(AUTHORIZATION, HeaderValue::from_static("Basic nope"));

        let entry = RealtimeData::new(1, 2, IndexMap::new());
        let endpoint = RealtimeDataEndpoint {
            installation_id: 100,
            input_group_list: vec!["G".to_string()],
        };
        let post = RealtimeDataPost {
            endpoint: &endpoint,
            data: &entry,
        };
        c.send(&post, Some(&extra)).unwrap();

        let req = c.transport().last();
        assert_eq!(header(&req, "Accept"), Some("application/json"));
        assert_eq!(header(&req, "Content-Type"), Some("text/plain"));
        assert_eq!(header(&req, "Authorization"), Some("Bearer fake-token"));
        assert!(req.headers.get(REFERER).is_some());
    }

    #[test]
    fn malformed_body_is_validation_error() {
        let c = authed();
        c.transport().push(200, r#"[{"indirizzoSlave": "01"}]"#);
        match c.febos_slaves(100, 789).unwrap_err() {
            FebosError::Validation { entity, field, reason } => {
                assert_eq!(entity, "GetFebosSlaveGetResponse");
                assert!(field.starts_with("[0]"), "{field}");
                assert!(reason.contains("missing field"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn slaves_and_analysis_decode() {
        let c = authed();
        c.transport().push(200, fixture("febos-slave.json"));
        c.transport().push(200, fixture("data-analysis.json"));

        let slaves = c.febos_slaves(100, 789).unwrap();
        assert_eq!(slaves[0].indirizzo_slave, "01");
        assert_eq!(slaves[0].temp, 215);

        let rows = c
            .data_analysis(100, 789, Some("2026-02-11 00:00:00"), Some("2026-02-11 23:59:59"))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].extra["R8774"], "---");
        let req = c.transport().last();
        assert!(req.url.ends_with("/v2/emmeti/100/789/febos-data/get-data-analysis"));
        assert_eq!(
            req.query,
            vec![
                ("from".to_string(), "2026-02-11 00:00:00".to_string()),
                ("to".to_string(), "2026-02-11 23:59:59".to_string())
            ]
        );
    }

    #[test]
    fn historical_data_passes_range_through() {
        let c = authed();
        c.transport().push(200, fixture("historical-data.json"));
        let entries = c
            .historical_data(
                7593,
                "FB-GRAPH-DATA@D9551@T31115",
                "2026-02-11 00:00:00",
                "2026-02-11 23:59:59",
            )
            .unwrap();
        assert_eq!(entries[0].device_id, 9551);
        assert_eq!(entries[0].data.len(), 3);
        for point in &entries[0].data {
            assert_eq!(point.vs.len(), entries[0].input_array.len());
        }

        let req = c.transport().last();
        assert!(req.url.ends_with("/v2/emmeti/7593/historical-data"));
        assert_eq!(
            req.query,
            vec![
                ("input_group_list".to_string(), "FB-GRAPH-DATA@D9551@T31115".to_string()),
                ("time_from".to_string(), "2026-02-11 00:00:00".to_string()),
                ("time_to".to_string(), "2026-02-11 23:59:59".to_string())
            ]
        );
    }

    #[test]
    fn transport_failures_propagate_unchanged() {
        let c = authed();
        // no canned response queued
        assert!(matches!(c.language(1, 2), Err(FebosError::Transport(_))));
        assert_eq!(c.transport().calls(), 1);
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let c = FebosClient::with_transport("https://example.test/", FakeTransport::new());
        assert_eq!(c.base_url(), "https://example.test");
    }
}
