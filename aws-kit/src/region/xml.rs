use super::{Endpoint, EndpointProvider};
use crate::Error;
use serde::Deserialize;
use std::collections::HashMap;

const BUNDLED_ENDPOINTS: &str = include_str!("endpoints.xml");

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Endpoints {
    #[serde(default)]
    region: Vec<RegionInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RegionInfo {
    name: String,
    #[serde(default)]
    endpoint: Vec<EndpointInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct EndpointInfo {
    service_name: String,
    #[serde(default)]
    http: bool,
    #[serde(default)]
    https: bool,
    hostname: String,
}

/// Endpoint table read from an XML document:
///
/// ```xml
/// <Endpoints>
///   <Region>
///     <Name>us-east-1</Name>
///     <Endpoint>
///       <ServiceName>glacier</ServiceName>
///       <Http>true</Http>
///       <Https>true</Https>
///       <Hostname>glacier.us-east-1.amazonaws.com</Hostname>
///     </Endpoint>
///   </Region>
/// </Endpoints>
/// ```
#[derive(Debug, Clone)]
pub struct XmlEndpointProvider {
    // region -> service -> endpoint
    regions: HashMap<String, HashMap<String, Endpoint>>,
}

impl XmlEndpointProvider {
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        let doc: Endpoints = quick_xml::de::from_str(xml)
            .map_err(|e| Error::InvalidArgument(format!("invalid endpoints xml: {e}")))?;

        let regions = doc
            .region
            .into_iter()
            .map(|r| {
                let services = r
                    .endpoint
                    .into_iter()
                    .map(|e| {
                        let mut schemes = Vec::with_capacity(2);
                        if e.https {
                            schemes.push("https".to_owned());
                        }
                        if e.http {
                            schemes.push("http".to_owned());
                        }
                        (e.service_name, Endpoint::new(e.hostname, schemes))
                    })
                    .collect();
                (r.name, services)
            })
            .collect();

        Ok(Self { regions })
    }

    /// Table shipped with the crate.
    pub fn bundled() -> Self {
        Self::from_xml(BUNDLED_ENDPOINTS).expect("bundled endpoints.xml is valid")
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

impl EndpointProvider for XmlEndpointProvider {
    fn get_endpoint(&self, service: &str, region: &str) -> Result<Endpoint, Error> {
        let services = self
            .regions
            .get(region)
            .ok_or_else(|| Error::InvalidArgument(format!("[{region}] is not a valid region")))?;
        services.get(service).cloned().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "[{service}] is not available in the [{region}] region"
            ))
        })
    }
}
