// ==========================================
// 工厂生产看板 - 实时协议
// ==========================================
// 每个 WebSocket 文本帧承载一个事件:
//   {"event": "<事件名>", "payload": {...}}
// 客户端 -> 服务端: update_<分区>，载荷 {date|month, data}
// 服务端 -> 新连接: initial_state，载荷为完整快照
// 服务端 -> 其他连接: <分区>_updated，载荷与收到的完全一致
// ==========================================

use crate::domain::{EntryList, GlobalState, Partition};
use crate::sync::error::SyncResult;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ==========================================
// 更新载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// 该周期的完整条目列表（null 视为空列表）
    #[serde(default, deserialize_with = "null_as_empty_list")]
    pub data: EntryList,
    /// 其余字段原样转发
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty_list<'de, D>(deserializer: D) -> Result<EntryList, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EntryList>::deserialize(deserializer)?.unwrap_or_default())
}

impl UpdatePayload {
    /// 按分区的周期类型构造载荷（日分区写 date，月分区写 month）
    pub fn for_period(partition: Partition, period_key: impl Into<String>, data: EntryList) -> Self {
        let key = Some(period_key.into());
        let (date, month) = match partition.period_kind() {
            crate::domain::PeriodKind::Date => (key, None),
            crate::domain::PeriodKind::Month => (None, key),
        };
        Self {
            date,
            month,
            data,
            extra: Map::new(),
        }
    }

    /// 周期键: date 优先，其次 month；空字符串视为缺失
    pub fn period_key(&self) -> Option<&str> {
        [self.date.as_deref(), self.month.as_deref()]
            .into_iter()
            .flatten()
            .find(|k| !k.is_empty())
    }
}

// ==========================================
// 客户端事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientEvent {
    #[serde(rename = "update_producao")]
    ProductionUpdate(UpdatePayload),
    #[serde(rename = "update_mensal")]
    MonthlyUpdate(UpdatePayload),
    #[serde(rename = "update_planReal")]
    PlanRealUpdate(UpdatePayload),
    #[serde(rename = "update_relatorio")]
    ReportUpdate(UpdatePayload),
    #[serde(rename = "update_paradas")]
    DowntimeUpdate(UpdatePayload),
}

impl ClientEvent {
    pub fn update(partition: Partition, payload: UpdatePayload) -> Self {
        match partition {
            Partition::Production => ClientEvent::ProductionUpdate(payload),
            Partition::Monthly => ClientEvent::MonthlyUpdate(payload),
            Partition::PlanReal => ClientEvent::PlanRealUpdate(payload),
            Partition::Report => ClientEvent::ReportUpdate(payload),
            Partition::Downtime => ClientEvent::DowntimeUpdate(payload),
        }
    }

    pub fn partition(&self) -> Partition {
        match self {
            ClientEvent::ProductionUpdate(_) => Partition::Production,
            ClientEvent::MonthlyUpdate(_) => Partition::Monthly,
            ClientEvent::PlanRealUpdate(_) => Partition::PlanReal,
            ClientEvent::ReportUpdate(_) => Partition::Report,
            ClientEvent::DowntimeUpdate(_) => Partition::Downtime,
        }
    }

    pub fn payload(&self) -> &UpdatePayload {
        match self {
            ClientEvent::ProductionUpdate(p)
            | ClientEvent::MonthlyUpdate(p)
            | ClientEvent::PlanRealUpdate(p)
            | ClientEvent::ReportUpdate(p)
            | ClientEvent::DowntimeUpdate(p) => p,
        }
    }

    pub fn into_parts(self) -> (Partition, UpdatePayload) {
        let partition = self.partition();
        match self {
            ClientEvent::ProductionUpdate(p)
            | ClientEvent::MonthlyUpdate(p)
            | ClientEvent::PlanRealUpdate(p)
            | ClientEvent::ReportUpdate(p)
            | ClientEvent::DowntimeUpdate(p) => (partition, p),
        }
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ==========================================
// 服务端事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    #[serde(rename = "initial_state")]
    InitialState(GlobalState),
    #[serde(rename = "producao_updated")]
    ProductionUpdated(UpdatePayload),
    #[serde(rename = "mensal_updated")]
    MonthlyUpdated(UpdatePayload),
    #[serde(rename = "planReal_updated")]
    PlanRealUpdated(UpdatePayload),
    #[serde(rename = "relatorio_updated")]
    ReportUpdated(UpdatePayload),
    #[serde(rename = "paradas_updated")]
    DowntimeUpdated(UpdatePayload),
}

impl ServerEvent {
    /// 某分区的广播事件
    pub fn updated(partition: Partition, payload: UpdatePayload) -> Self {
        match partition {
            Partition::Production => ServerEvent::ProductionUpdated(payload),
            Partition::Monthly => ServerEvent::MonthlyUpdated(payload),
            Partition::PlanReal => ServerEvent::PlanRealUpdated(payload),
            Partition::Report => ServerEvent::ReportUpdated(payload),
            Partition::Downtime => ServerEvent::DowntimeUpdated(payload),
        }
    }

    /// 增量事件对应的分区（initial_state 为 None）
    pub fn partition(&self) -> Option<Partition> {
        match self {
            ServerEvent::InitialState(_) => None,
            ServerEvent::ProductionUpdated(_) => Some(Partition::Production),
            ServerEvent::MonthlyUpdated(_) => Some(Partition::Monthly),
            ServerEvent::PlanRealUpdated(_) => Some(Partition::PlanReal),
            ServerEvent::ReportUpdated(_) => Some(Partition::Report),
            ServerEvent::DowntimeUpdated(_) => Some(Partition::Downtime),
        }
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_wire_format() {
        let text = r#"{"event":"update_producao","payload":{"date":"2024-01-01","data":[{"id":"a","codigo":"204"}]}}"#;
        let event = ClientEvent::from_json(text).unwrap();

        assert_eq!(event.partition(), Partition::Production);
        assert_eq!(event.payload().period_key(), Some("2024-01-01"));
        assert_eq!(event.payload().data.len(), 1);

        let value: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "update_producao");
        assert_eq!(value["payload"]["date"], "2024-01-01");
        assert!(value["payload"].get("month").is_none());
    }

    #[test]
    fn test_event_names_match_partition_tokens() {
        for partition in Partition::ALL {
            let payload = UpdatePayload::for_period(partition, "k", vec![]);
            let client: Value =
                serde_json::to_value(ClientEvent::update(partition, payload.clone())).unwrap();
            assert_eq!(client["event"], partition.update_event());

            let server: Value =
                serde_json::to_value(ServerEvent::updated(partition, payload)).unwrap();
            assert_eq!(server["event"], partition.updated_event());
        }
    }

    #[test]
    fn test_period_key_prefers_date_then_month() {
        let payload: UpdatePayload =
            serde_json::from_value(json!({"date": "", "month": "2024-01", "data": []})).unwrap();
        assert_eq!(payload.period_key(), Some("2024-01"));

        let payload: UpdatePayload = serde_json::from_value(json!({"data": null})).unwrap();
        assert_eq!(payload.period_key(), None);
        assert!(payload.data.is_empty());

        let monthly = UpdatePayload::for_period(Partition::Report, "2024-02", vec![]);
        assert_eq!(monthly.month.as_deref(), Some("2024-02"));
        assert!(monthly.date.is_none());
    }

    #[test]
    fn test_unknown_payload_fields_round_trip() {
        let payload: UpdatePayload = serde_json::from_value(json!({
            "date": "2024-01-01",
            "data": [],
            "origem": "tablet-3"
        }))
        .unwrap();
        let back = serde_json::to_value(ServerEvent::updated(Partition::Downtime, payload)).unwrap();
        assert_eq!(back["payload"]["origem"], "tablet-3");
    }

    #[test]
    fn test_initial_state_carries_full_snapshot() {
        let event = ServerEvent::InitialState(GlobalState::empty());
        let value: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "initial_state");
        assert_eq!(value["payload"].as_object().unwrap().len(), 5);
        assert_eq!(event.partition(), None);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(ClientEvent::from_json(r#"{"event":"update_foo","payload":{}}"#).is_err());
        assert!(ClientEvent::from_json("not json").is_err());
    }
}
