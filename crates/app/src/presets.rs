//! Canned GATT layouts.

use perihub_domain::characteristic::{
    Characteristic, Permission, PermissionSet, Property, PropertySet,
};
use perihub_domain::error::{PeripheralError, RegistryError, ValidationError};
use perihub_domain::id::AttributeUuid;

use crate::router::PeripheralHandle;

pub const HEART_RATE_SERVICE: &str = "180D";
pub const HEART_RATE_MEASUREMENT: &str = "2A37";
pub const BODY_SENSOR_LOCATION: &str = "2A38";
pub const HEART_RATE_CONTROL_POINT: &str = "2A39";

/// Body sensor location "chest".
const CHEST: u8 = 0x01;

fn parse(uuid: &str) -> Result<AttributeUuid, ValidationError> {
    AttributeUuid::parse(uuid)
}

/// A duplicate service means the preset was already (partly) applied.
fn tolerate_duplicate_service(result: Result<(), PeripheralError>) -> Result<(), PeripheralError> {
    match result {
        Err(PeripheralError::Registry(RegistryError::DuplicateService { .. })) => Ok(()),
        other => other,
    }
}

/// Register `characteristic`, accepting a duplicate only when the existing
/// one already lives under the same service.
async fn ensure_characteristic(
    handle: &PeripheralHandle,
    characteristic: Characteristic,
) -> Result<(), PeripheralError> {
    let service = characteristic.service_uuid.clone();
    match handle.add_characteristic(characteristic).await {
        Err(PeripheralError::Registry(RegistryError::DuplicateCharacteristic { uuid })) => {
            let owned = handle.list_characteristics().await?.iter().any(|info| {
                info.characteristic.uuid == uuid && info.characteristic.service_uuid == service
            });
            if owned {
                Ok(())
            } else {
                tracing::warn!(%uuid, %service, "characteristic registered under another service");
                Err(RegistryError::DuplicateCharacteristic { uuid }.into())
            }
        }
        other => other,
    }
}

/// Install the standard Heart Rate service (`180D`).
///
/// - `2A37` measurement: notify, readable
/// - `2A38` body sensor location: read, readable, initialized to chest
/// - `2A39` control point: write, writeable
///
/// Applying it twice is harmless.
///
/// # Errors
///
/// Propagates any failure other than a duplicate registration of the
/// preset's own attributes. A preset characteristic UUID already taken by
/// another service is a [`RegistryError::DuplicateCharacteristic`].
#[tracing::instrument(skip(handle))]
pub async fn heart_rate(handle: &PeripheralHandle) -> Result<(), PeripheralError> {
    let service = parse(HEART_RATE_SERVICE)?;
    tolerate_duplicate_service(handle.add_service(service.clone(), true).await)?;

    let characteristics = [
        (
            HEART_RATE_MEASUREMENT,
            PropertySet::empty().with(Property::Notify),
            PermissionSet::empty().with(Permission::Readable),
        ),
        (
            BODY_SENSOR_LOCATION,
            PropertySet::empty().with(Property::Read),
            PermissionSet::empty().with(Permission::Readable),
        ),
        (
            HEART_RATE_CONTROL_POINT,
            PropertySet::empty().with(Property::Write),
            PermissionSet::empty().with(Permission::Writeable),
        ),
    ];
    for (uuid, properties, permissions) in characteristics {
        let characteristic = Characteristic::builder(parse(uuid)?, service.clone())
            .properties(properties)
            .permissions(permissions)
            .build();
        ensure_characteristic(handle, characteristic).await?;
    }

    handle
        .update_value(service, parse(BODY_SENSOR_LOCATION)?, vec![CHEST], None)
        .await?;
    tracing::info!("heart rate preset applied");
    Ok(())
}

/// Heart Rate preset, then advertise it under `local_name`.
///
/// # Errors
///
/// Fails like [`heart_rate`], or when advertising cannot start.
pub async fn quick_start(handle: &PeripheralHandle, local_name: &str) -> Result<(), PeripheralError> {
    heart_rate(handle).await?;
    handle
        .start_advertising(local_name, Some(vec![parse(HEART_RATE_SERVICE)?]))
        .await
}
