/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::*;
use driver_location_service::{
    profile::*,
    tools::error::AppError,
};

fn profile(id: &str, name: &str) -> DriverProfile {
    DriverProfile {
        driver_id: driver(id),
        name: name.to_string(),
        vehicle_type: Some("auto".to_string()),
        license_plate: None,
        phone_number: None,
    }
}

#[tokio::test]
async fn create_rejects_duplicates() {
    let store = InMemoryProfileStore::new();

    store
        .create_profile(profile("d1", "Ravi"))
        .await
        .expect("Failed to create profile");
    assert!(matches!(
        store.create_profile(profile("d1", "Someone Else")).await,
        Err(AppError::DriverAlreadyExists(_))
    ));

    let stored = store
        .get_profile(&driver("d1"))
        .await
        .expect("lookup")
        .expect("profile");
    assert_eq!(stored.name, "Ravi");
}

#[tokio::test]
async fn update_only_touches_supplied_fields() {
    let store = InMemoryProfileStore::new();
    store.create_profile(profile("d1", "Ravi")).await.expect("create");

    let updated = store
        .update_profile(
            &driver("d1"),
            DriverProfileUpdate {
                license_plate: Some("KA05MN0001".to_string()),
                ..DriverProfileUpdate::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.name, "Ravi");
    assert_eq!(updated.vehicle_type.as_deref(), Some("auto"));
    assert_eq!(updated.license_plate.as_deref(), Some("KA05MN0001"));

    assert!(matches!(
        store
            .update_profile(&driver("ghost"), DriverProfileUpdate::default())
            .await,
        Err(AppError::DriverNotFound(_))
    ));
}

#[tokio::test]
async fn details_need_at_least_one_side() {
    let (index, _) = index_at(1_000);
    index
        .report_location(report("d1", 1.0, 1.0, 1_000, None))
        .await
        .expect("report");
    let location = index.get_driver(&driver("d1")).await.ok();

    let details = DriverDetails::join(driver("d1"), None, location).expect("details");
    assert!(details.profile.is_none());
    assert!(details.location.is_some());

    assert!(DriverDetails::join(driver("d2"), None, None).is_none());
}
