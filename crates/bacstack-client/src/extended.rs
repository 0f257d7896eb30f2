//! Building-automation conveniences composed from ReadProperty and
//! WriteProperty.
//!
//! [`ExtendedClient`] works over anything that implements [`PropertyAccess`],
//! which [`BacnetClient`](crate::BacnetClient) does.

use crate::{BacnetClient, ClientBitString, ClientDataValue, ClientError, PropertyValue};
use bacstack_core::types::{ObjectId, ObjectType, PropertyId, Time};
use bacstack_datalink::DataLinkAddress;
use futures_util::future::try_join_all;
use std::future::Future;
use std::net::Ipv4Addr;

/// The two property services the extended layer is built from.
pub trait PropertyAccess: Send + Sync {
    fn read_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
    ) -> impl Future<Output = Result<PropertyValue, ClientError>> + Send;

    fn write_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
        values: &[ClientDataValue],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl PropertyAccess for BacnetClient {
    async fn read_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
    ) -> Result<PropertyValue, ClientError> {
        BacnetClient::read_property(self, address, device_id, object_type, instance, property_id)
            .await
    }

    async fn write_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
        values: &[ClientDataValue],
    ) -> Result<(), ClientError> {
        BacnetClient::write_property(
            self,
            address,
            device_id,
            object_type,
            instance,
            property_id,
            values,
        )
        .await
    }
}

/// Days of the week a recipient is notified on, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Default for ValidDays {
    fn default() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
        }
    }
}

impl ValidDays {
    fn bits(&self) -> [bool; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }
}

/// Event transitions a recipient is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transitions {
    pub to_off_normal: bool,
    pub to_fault: bool,
    pub to_normal: bool,
}

impl Default for Transitions {
    fn default() -> Self {
        Self {
            to_off_normal: true,
            to_fault: true,
            to_normal: true,
        }
    }
}

/// Adds this station as a recipient of notification-class objects.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationClassActivation {
    pub address: DataLinkAddress,
    pub device_id: u32,
    /// Instances of the NotificationClass objects to update.
    pub instances: Vec<u32>,
    /// IPv4 address notifications are sent to.
    pub recipient_ip: Ipv4Addr,
    pub recipient_port: u16,
    pub process_id: u32,
    pub valid_days: ValidDays,
    pub from_time: Time,
    pub to_time: Time,
    pub transitions: Transitions,
}

impl NotificationClassActivation {
    /// Every day, all day, every transition, recipient port 47808.
    pub fn new(
        address: DataLinkAddress,
        device_id: u32,
        instances: Vec<u32>,
        recipient_ip: Ipv4Addr,
        process_id: u32,
    ) -> Self {
        Self {
            address,
            device_id,
            instances,
            recipient_ip,
            recipient_port: DataLinkAddress::BACNET_IP_DEFAULT_PORT,
            process_id,
            valid_days: ValidDays::default(),
            from_time: Time::new(0, 0, 0, 0),
            to_time: Time::new(23, 59, 59, 0),
            transitions: Transitions::default(),
        }
    }

    /// One BACnetDestination: days, window, recipient address, process id,
    /// unconfirmed delivery, transitions.
    pub fn recipient_values(&self) -> Vec<ClientDataValue> {
        let mut mac = self.recipient_ip.octets().to_vec();
        mac.extend_from_slice(&self.recipient_port.to_be_bytes());
        let transitions = [
            self.transitions.to_off_normal,
            self.transitions.to_fault,
            self.transitions.to_normal,
        ];
        vec![
            ClientDataValue::BitString(ClientBitString::from_bits(&self.valid_days.bits())),
            ClientDataValue::Time(self.from_time),
            ClientDataValue::Time(self.to_time),
            ClientDataValue::OpeningTag(1),
            ClientDataValue::Unsigned(0),
            ClientDataValue::OctetString(mac),
            ClientDataValue::ClosingTag(1),
            ClientDataValue::Unsigned(self.process_id),
            ClientDataValue::Boolean(false),
            ClientDataValue::BitString(ClientBitString::from_bits(&transitions)),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limit {
    pub enable: bool,
    /// New limit value; the current limit is kept when unset.
    pub value: Option<f32>,
}

/// Intrinsic-reporting limits of an analog object.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarming {
    pub address: DataLinkAddress,
    pub device_id: u32,
    pub object_type: ObjectType,
    pub instance: u32,
    pub low_limit: Limit,
    pub high_limit: Limit,
}

/// Higher-level operations over a [`PropertyAccess`] implementation.
#[derive(Debug, Clone)]
pub struct ExtendedClient<C> {
    inner: C,
}

impl<C: PropertyAccess> ExtendedClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    /// OBJECT_LIST of the device object.
    pub async fn read_object_list(
        &self,
        address: DataLinkAddress,
        device_id: u32,
    ) -> Result<Vec<ObjectId>, ClientError> {
        let value = self
            .inner
            .read_property(
                address,
                device_id,
                ObjectType::Device,
                device_id,
                PropertyId::ObjectList,
            )
            .await?;
        match value {
            PropertyValue::ObjectList(ids) => Ok(ids),
            other => other
                .into_values()
                .into_iter()
                .map(|v| match v {
                    ClientDataValue::ObjectId(id) => Ok(id),
                    _ => Err(ClientError::UnsupportedResponse),
                })
                .collect(),
        }
    }

    pub async fn read_present_value(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
    ) -> Result<PropertyValue, ClientError> {
        self.inner
            .read_property(
                address,
                device_id,
                object_type,
                instance,
                PropertyId::PresentValue,
            )
            .await
    }

    /// Writes the recipient list of every listed notification class at
    /// once. Fails with the first error.
    pub async fn activate_notification_classes(
        &self,
        activation: &NotificationClassActivation,
    ) -> Result<(), ClientError> {
        let values = activation.recipient_values();
        let writes = activation.instances.iter().map(|&instance| {
            self.inner.write_property(
                activation.address,
                activation.device_id,
                ObjectType::NotificationClass,
                instance,
                PropertyId::RecipientList,
                &values,
            )
        });
        try_join_all(writes).await?;
        Ok(())
    }

    /// Enables or disables the low and high limits, then writes any new
    /// limit values.
    pub async fn set_alarming(&self, alarming: &Alarming) -> Result<(), ClientError> {
        let write = |property_id: PropertyId, values: Vec<ClientDataValue>| async move {
            self.inner
                .write_property(
                    alarming.address,
                    alarming.device_id,
                    alarming.object_type,
                    alarming.instance,
                    property_id,
                    &values,
                )
                .await
        };

        let enable = ClientBitString::from_bits(&[alarming.low_limit.enable, alarming.high_limit.enable]);
        write(PropertyId::LimitEnable, vec![ClientDataValue::BitString(enable)]).await?;
        if let Some(low) = alarming.low_limit.value {
            write(PropertyId::LowLimit, vec![ClientDataValue::Real(low)]).await?;
        }
        if let Some(high) = alarming.high_limit.value {
            write(PropertyId::HighLimit, vec![ClientDataValue::Real(high)]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Alarming, ExtendedClient, Limit, NotificationClassActivation, PropertyAccess};
    use crate::{ClientBitString, ClientDataValue, ClientError, PropertyValue};
    use bacstack_core::types::{ObjectId, ObjectType, PropertyId, Time};
    use bacstack_datalink::DataLinkAddress;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Mutex;

    type Write = (ObjectType, u32, PropertyId, Vec<ClientDataValue>);

    #[derive(Default)]
    struct FakeDevice {
        writes: Mutex<Vec<Write>>,
        reads: Mutex<Vec<(ObjectType, u32, PropertyId)>>,
        fail_instance: Option<u32>,
    }

    impl PropertyAccess for FakeDevice {
        async fn read_property(
            &self,
            _address: DataLinkAddress,
            _device_id: u32,
            object_type: ObjectType,
            instance: u32,
            property_id: PropertyId,
        ) -> Result<PropertyValue, ClientError> {
            self.reads
                .lock()
                .unwrap()
                .push((object_type, instance, property_id));
            Ok(match property_id {
                PropertyId::ObjectList => PropertyValue::ObjectList(vec![
                    ObjectId::new(ObjectType::Device, instance),
                    ObjectId::new(ObjectType::AnalogInput, 0),
                ]),
                _ => PropertyValue::Value(ClientDataValue::Real(21.5)),
            })
        }

        async fn write_property(
            &self,
            _address: DataLinkAddress,
            _device_id: u32,
            object_type: ObjectType,
            instance: u32,
            property_id: PropertyId,
            values: &[ClientDataValue],
        ) -> Result<(), ClientError> {
            if self.fail_instance == Some(instance) {
                return Err(ClientError::RemoteReject { reason: 2 });
            }
            self.writes
                .lock()
                .unwrap()
                .push((object_type, instance, property_id, values.to_vec()));
            Ok(())
        }
    }

    fn device() -> DataLinkAddress {
        DataLinkAddress::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 47808))
    }

    #[tokio::test]
    async fn object_list_reads_the_device_object() {
        let client = ExtendedClient::new(FakeDevice::default());
        let ids = client.read_object_list(device(), 1234).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(
            client.inner().reads.lock().unwrap()[0],
            (ObjectType::Device, 1234, PropertyId::ObjectList)
        );
    }

    #[tokio::test]
    async fn present_value_reads_property_85() {
        let client = ExtendedClient::new(FakeDevice::default());
        let value = client
            .read_present_value(device(), 1234, ObjectType::AnalogInput, 3)
            .await
            .unwrap();
        assert_eq!(value, PropertyValue::Value(ClientDataValue::Real(21.5)));
        assert_eq!(
            client.inner().reads.lock().unwrap()[0],
            (ObjectType::AnalogInput, 3, PropertyId::PresentValue)
        );
    }

    #[test]
    fn recipient_values_use_defaults() {
        let activation = NotificationClassActivation::new(
            device(),
            1234,
            vec![1],
            Ipv4Addr::new(192, 168, 1, 20),
            7,
        );
        assert_eq!(
            activation.recipient_values(),
            vec![
                ClientDataValue::BitString(ClientBitString::from_bits(&[true; 7])),
                ClientDataValue::Time(Time::new(0, 0, 0, 0)),
                ClientDataValue::Time(Time::new(23, 59, 59, 0)),
                ClientDataValue::OpeningTag(1),
                ClientDataValue::Unsigned(0),
                ClientDataValue::OctetString(vec![192, 168, 1, 20, 0xBA, 0xC0]),
                ClientDataValue::ClosingTag(1),
                ClientDataValue::Unsigned(7),
                ClientDataValue::Boolean(false),
                ClientDataValue::BitString(ClientBitString::from_bits(&[true; 3])),
            ]
        );
    }

    #[tokio::test]
    async fn every_notification_class_is_written() {
        let client = ExtendedClient::new(FakeDevice::default());
        let mut activation = NotificationClassActivation::new(
            device(),
            1234,
            vec![1, 2, 3],
            Ipv4Addr::new(192, 168, 1, 20),
            7,
        );
        activation.recipient_port = 47809;
        activation.valid_days.sunday = false;
        client
            .activate_notification_classes(&activation)
            .await
            .unwrap();

        let writes = client.inner().writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        for (object_type, _, property_id, values) in writes.iter() {
            assert_eq!(*object_type, ObjectType::NotificationClass);
            assert_eq!(*property_id, PropertyId::RecipientList);
            assert_eq!(
                values[0],
                ClientDataValue::BitString(ClientBitString::from_bits(&[
                    true, true, true, true, true, true, false
                ]))
            );
            assert_eq!(
                values[5],
                ClientDataValue::OctetString(vec![192, 168, 1, 20, 0xBA, 0xC1])
            );
        }
    }

    #[tokio::test]
    async fn failed_notification_class_write_is_returned() {
        let client = ExtendedClient::new(FakeDevice {
            fail_instance: Some(2),
            ..FakeDevice::default()
        });
        let activation = NotificationClassActivation::new(
            device(),
            1234,
            vec![1, 2],
            Ipv4Addr::new(192, 168, 1, 20),
            7,
        );
        let err = client
            .activate_notification_classes(&activation)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RemoteReject { reason: 2 }));
    }

    #[tokio::test]
    async fn alarming_writes_enable_then_limits() {
        let client = ExtendedClient::new(FakeDevice::default());
        client
            .set_alarming(&Alarming {
                address: device(),
                device_id: 1234,
                object_type: ObjectType::AnalogInput,
                instance: 4,
                low_limit: Limit {
                    enable: true,
                    value: Some(10.0),
                },
                high_limit: Limit {
                    enable: false,
                    value: None,
                },
            })
            .await
            .unwrap();

        let writes = client.inner().writes.lock().unwrap();
        assert_eq!(
            *writes,
            vec![
                (
                    ObjectType::AnalogInput,
                    4,
                    PropertyId::LimitEnable,
                    vec![ClientDataValue::BitString(ClientBitString::from_bits(&[
                        true, false
                    ]))],
                ),
                (
                    ObjectType::AnalogInput,
                    4,
                    PropertyId::LowLimit,
                    vec![ClientDataValue::Real(10.0)],
                ),
            ]
        );
    }
}
