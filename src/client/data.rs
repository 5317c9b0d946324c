//! Record, sensor, vessel and export endpoints.

use super::core::{rejected, require_id, MatsyaClient};
use crate::envelope::ApiResponse;
use crate::transport::QueryParams;
use crate::types::{
    ExportRequest, ExportResult, MarineDataPage, MarineDataQuery, MarineRecord,
    OceanographicQuery, OceanographicReading, Vessel, VesselQuery,
};

impl MatsyaClient {
    pub async fn marine_data(&self, query: &MarineDataQuery) -> ApiResponse<MarineDataPage> {
        if let Err(e) = query.validate() {
            return rejected(e);
        }
        let params = match QueryParams::from_filters(query) {
            Ok(p) => p,
            Err(e) => return rejected(e),
        };
        self.transport.get(&["data", "marine"], Some(&params)).await
    }

    pub async fn marine_record(&self, id: &str) -> ApiResponse<MarineRecord> {
        if let Err(e) = require_id("id", id) {
            return rejected(e);
        }
        self.transport.get(&["data", "marine", id], None).await
    }

    pub async fn oceanographic_data(
        &self,
        query: &OceanographicQuery,
    ) -> ApiResponse<Vec<OceanographicReading>> {
        if let Err(e) = query.validate() {
            return rejected(e);
        }
        let params = match QueryParams::from_filters(query) {
            Ok(p) => p,
            Err(e) => return rejected(e),
        };
        self.transport.get(&["oceanographic"], Some(&params)).await
    }

    /// Latest sensor readings, for every sensor or just `sensor_id`.
    pub async fn realtime_oceanographic(
        &self,
        sensor_id: Option<&str>,
    ) -> ApiResponse<Vec<OceanographicReading>> {
        match sensor_id {
            Some(id) => {
                if let Err(e) = require_id("sensorId", id) {
                    return rejected(e);
                }
                self.transport
                    .get(&["oceanographic", "realtime", id], None)
                    .await
            }
            None => self.transport.get(&["oceanographic", "realtime"], None).await,
        }
    }

    pub async fn vessels(&self, query: &VesselQuery) -> ApiResponse<Vec<Vessel>> {
        if let Err(e) = query.validate() {
            return rejected(e);
        }
        let params = match QueryParams::from_filters(query) {
            Ok(p) => p,
            Err(e) => return rejected(e),
        };
        self.transport.get(&["vessels"], Some(&params)).await
    }

    pub async fn vessel(&self, id: &str) -> ApiResponse<Vessel> {
        if let Err(e) = require_id("id", id) {
            return rejected(e);
        }
        self.transport.get(&["vessels", id], None).await
    }

    pub async fn export_data(&self, request: &ExportRequest) -> ApiResponse<ExportResult> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        self.transport.post_json(&["data", "export"], request).await
    }
}
