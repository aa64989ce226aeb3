/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::profile::DriverProfile;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub driver_id: String,
    pub name: String,
    pub vehicle_type: Option<String>,
    pub license_plate: Option<String>,
    pub phone_number: Option<String>,
}

impl From<CreateDriverRequest> for DriverProfile {
    fn from(request: CreateDriverRequest) -> Self {
        DriverProfile {
            driver_id: DriverId(request.driver_id),
            name: request.name,
            vehicle_type: request.vehicle_type,
            license_plate: request.license_plate,
            phone_number: request.phone_number,
        }
    }
}
