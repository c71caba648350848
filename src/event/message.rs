//! The closed enumeration of known supplicant event kinds and the on-wire
//! prefix table that maps textual prefixes to it.
//!
//! Recovered in full from `wpa_supplicant`'s `ctrl_iface_page.html`-documented
//! event list (`WpaMessages.h` in the original implementation this crate is
//! ported from). The macro below is the single source of truth the original
//! author's design notes ask for: one token list drives both the enum and
//! the lookup table, so they cannot drift apart.

use std::collections::HashMap;
use std::sync::OnceLock;

macro_rules! wpa_messages {
  ( $( $variant:ident => $prefix:literal ),+ $(,)? ) => {
    /// One class of unsolicited supplicant event, identified by its on-wire
    /// textual prefix. `Unknown` is the sentinel for any prefix not in this
    /// table; the original string is then recoverable from
    /// `EventRecord::raw_kind`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[non_exhaustive]
    pub enum MessageKind {
      /// Prefix did not match any entry in the known-kind table.
      Unknown,
      /// `CTRL-REQ-*` — interactive request for identity/password/pin.
      /// Matched by prefix, not by exact token, since the remainder of the
      /// token carries the field name and network id.
      WpaCtrlReq,
      /// `CTRL-RSP-*` — response to an identity/password/pin request.
      WpaCtrlRsp,
      $( #[doc = concat!("`", $prefix, "`")] $variant, )+
    }

    impl MessageKind {
      /// Every (kind, exact on-wire prefix) pair this crate knows about,
      /// excluding `Unknown`/`WpaCtrlReq`/`WpaCtrlRsp` which are matched
      /// specially (see `lookup`).
      pub const KNOWN: &'static [(MessageKind, &'static str)] = &[
        $( (MessageKind::$variant, $prefix), )+
      ];
    }
  };
}

wpa_messages! {
  WpaEventConnected => "CTRL-EVENT-CONNECTED",
  WpaEventDisconnected => "CTRL-EVENT-DISCONNECTED",
  WpaEventAssocReject => "CTRL-EVENT-ASSOC-REJECT",
  WpaEventAuthReject => "CTRL-EVENT-AUTH-REJECT",
  WpaEventTerminating => "CTRL-EVENT-TERMINATING",
  WpaEventPasswordChanged => "CTRL-EVENT-PASSWORD-CHANGED",
  WpaEventEapNotification => "CTRL-EVENT-EAP-NOTIFICATION",
  WpaEventEapStarted => "CTRL-EVENT-EAP-STARTED",
  WpaEventEapProposedMethod => "CTRL-EVENT-EAP-PROPOSED-METHOD",
  WpaEventEapMethod => "CTRL-EVENT-EAP-METHOD",
  WpaEventEapPeerCert => "CTRL-EVENT-EAP-PEER-CERT",
  WpaEventEapPeerAlt => "CTRL-EVENT-EAP-PEER-ALT",
  WpaEventEapTlsCertError => "CTRL-EVENT-EAP-TLS-CERT-ERROR",
  WpaEventEapStatus => "CTRL-EVENT-EAP-STATUS",
  WpaEventEapRetransmit => "CTRL-EVENT-EAP-RETRANSMIT",
  WpaEventEapRetransmit2 => "CTRL-EVENT-EAP-RETRANSMIT2",
  WpaEventEapSuccess => "CTRL-EVENT-EAP-SUCCESS",
  WpaEventEapSuccess2 => "CTRL-EVENT-EAP-SUCCESS2",
  WpaEventEapFailure => "CTRL-EVENT-EAP-FAILURE",
  WpaEventEapFailure2 => "CTRL-EVENT-EAP-FAILURE2",
  WpaEventEapTimeoutFailure => "CTRL-EVENT-EAP-TIMEOUT-FAILURE",
  WpaEventEapTimeoutFailure2 => "CTRL-EVENT-EAP-TIMEOUT-FAILURE2",
  WpaEventEapErrorCode => "EAP-ERROR-CODE",
  WpaEventTempDisabled => "CTRL-EVENT-SSID-TEMP-DISABLED",
  WpaEventReenabled => "CTRL-EVENT-SSID-REENABLED",
  WpaEventScanStarted => "CTRL-EVENT-SCAN-STARTED",
  WpaEventScanResults => "CTRL-EVENT-SCAN-RESULTS",
  WpaEventScanFailed => "CTRL-EVENT-SCAN-FAILED",
  WpaEventStateChange => "CTRL-EVENT-STATE-CHANGE",
  WpaEventBssAdded => "CTRL-EVENT-BSS-ADDED",
  WpaEventBssRemoved => "CTRL-EVENT-BSS-REMOVED",
  WpaEventNetworkNotFound => "CTRL-EVENT-NETWORK-NOT-FOUND",
  WpaEventSignalChange => "CTRL-EVENT-SIGNAL-CHANGE",
  WpaEventBeaconLoss => "CTRL-EVENT-BEACON-LOSS",
  WpaEventRegdomChange => "CTRL-EVENT-REGDOM-CHANGE",
  WpaEventChannelSwitchStarted => "CTRL-EVENT-STARTED-CHANNEL-SWITCH",
  WpaEventChannelSwitch => "CTRL-EVENT-CHANNEL-SWITCH",
  WpaEventSaeUnknownPasswordIdentifier => "CTRL-EVENT-SAE-UNKNOWN-PASSWORD-IDENTIFIER",
  WpaEventUnprotBeacon => "CTRL-EVENT-UNPROT-BEACON",
  WpaEventDoRoam => "CTRL-EVENT-DO-ROAM",
  WpaEventSkipRoam => "CTRL-EVENT-SKIP-ROAM",
  WpaEventSubnetStatusUpdate => "CTRL-EVENT-SUBNET-STATUS-UPDATE",
  IbssRsnCompleted => "IBSS-RSN-COMPLETED",
  WpaEventFreqConflict => "CTRL-EVENT-FREQ-CONFLICT",
  WpaEventAvoidFreq => "CTRL-EVENT-AVOID-FREQ",
  WpaEventNetworkAdded => "CTRL-EVENT-NETWORK-ADDED",
  WpaEventNetworkRemoved => "CTRL-EVENT-NETWORK-REMOVED",
  WpaEventMscsResult => "CTRL-EVENT-MSCS-RESULT",
  WpsEventOverlap => "WPS-OVERLAP-DETECTED",
  WpsEventApAvailablePbc => "WPS-AP-AVAILABLE-PBC",
  WpsEventApAvailableAuth => "WPS-AP-AVAILABLE-AUTH",
  WpsEventApAvailablePin => "WPS-AP-AVAILABLE-PIN",
  WpsEventApAvailable => "WPS-AP-AVAILABLE",
  WpsEventCredReceived => "WPS-CRED-RECEIVED",
  WpsEventM2d => "WPS-M2D",
  WpsEventFail => "WPS-FAIL",
  WpsEventSuccess => "WPS-SUCCESS",
  WpsEventTimeout => "WPS-TIMEOUT",
  WpsEventActive => "WPS-PBC-ACTIVE",
  WpsEventDisable => "WPS-PBC-DISABLE",
  WpsEventEnrolleeSeen => "WPS-ENROLLEE-SEEN",
  WpsEventOpenNetwork => "WPS-OPEN-NETWORK",
  WpaEventScsResult => "CTRL-EVENT-SCS-RESULT",
  WpaEventDscpPolicy => "CTRL-EVENT-DSCP-POLICY",
  WpsEventErApAdd => "WPS-ER-AP-ADD",
  WpsEventErApRemove => "WPS-ER-AP-REMOVE",
  WpsEventErEnrolleeAdd => "WPS-ER-ENROLLEE-ADD",
  WpsEventErEnrolleeRemove => "WPS-ER-ENROLLEE-REMOVE",
  WpsEventErApSettings => "WPS-ER-AP-SETTINGS",
  WpsEventErSetSelReg => "WPS-ER-AP-SET-SEL-REG",
  DppEventAuthSuccess => "DPP-AUTH-SUCCESS",
  DppEventAuthInitFailed => "DPP-AUTH-INIT-FAILED",
  DppEventNotCompatible => "DPP-NOT-COMPATIBLE",
  DppEventResponsePending => "DPP-RESPONSE-PENDING",
  DppEventScanPeerQrCode => "DPP-SCAN-PEER-QR-CODE",
  DppEventAuthDirection => "DPP-AUTH-DIRECTION",
  DppEventConfReceived => "DPP-CONF-RECEIVED",
  DppEventConfSent => "DPP-CONF-SENT",
  DppEventConfFailed => "DPP-CONF-FAILED",
  DppEventConnStatusResult => "DPP-CONN-STATUS-RESULT",
  DppEventConfobjAkm => "DPP-CONFOBJ-AKM",
  DppEventConfobjSsid => "DPP-CONFOBJ-SSID",
  DppEventConfobjSsidCharset => "DPP-CONFOBJ-SSID-CHARSET",
  DppEventConfobjPass => "DPP-CONFOBJ-PASS",
  DppEventConfobjPsk => "DPP-CONFOBJ-PSK",
  DppEventConnector => "DPP-CONNECTOR",
  DppEventCSignKey => "DPP-C-SIGN-KEY",
  DppEventPpKey => "DPP-PP-KEY",
  DppEventNetAccessKey => "DPP-NET-ACCESS-KEY",
  DppEventServerName => "DPP-SERVER-NAME",
  DppEventCertbag => "DPP-CERTBAG",
  DppEventCacert => "DPP-CACERT",
  DppEventMissingConnector => "DPP-MISSING-CONNECTOR",
  DppEventNetworkId => "DPP-NETWORK-ID",
  DppEventConfiguratorId => "DPP-CONFIGURATOR-ID",
  DppEventRx => "DPP-RX",
  DppEventTx => "DPP-TX",
  DppEventTxStatus => "DPP-TX-STATUS",
  DppEventFail => "DPP-FAIL",
  DppEventPkexTLimit => "DPP-PKEX-T-LIMIT",
  DppEventIntro => "DPP-INTRO",
  DppEventConfReqRx => "DPP-CONF-REQ-RX",
  DppEventChirpStopped => "DPP-CHIRP-STOPPED",
  DppEventMudUrl => "DPP-MUD-URL",
  DppEventBandSupport => "DPP-BAND-SUPPORT",
  DppEventCsr => "DPP-CSR",
  DppEventChirpRx => "DPP-CHIRP-RX",
  MeshGroupStarted => "MESH-GROUP-STARTED",
  MeshGroupRemoved => "MESH-GROUP-REMOVED",
  MeshPeerConnected => "MESH-PEER-CONNECTED",
  MeshPeerDisconnected => "MESH-PEER-DISCONNECTED",
  MeshSaeAuthFailure => "MESH-SAE-AUTH-FAILURE",
  MeshSaeAuthBlocked => "MESH-SAE-AUTH-BLOCKED",
  WmmAcEventTspecAdded => "TSPEC-ADDED",
  WmmAcEventTspecRemoved => "TSPEC-REMOVED",
  WmmAcEventTspecReqFailed => "TSPEC-REQ-FAILED",
  P2pEventDeviceFound => "P2P-DEVICE-FOUND",
  P2pEventDeviceLost => "P2P-DEVICE-LOST",
  P2pEventGoNegRequest => "P2P-GO-NEG-REQUEST",
  P2pEventGoNegSuccess => "P2P-GO-NEG-SUCCESS",
  P2pEventGoNegFailure => "P2P-GO-NEG-FAILURE",
  P2pEventGroupFormationSuccess => "P2P-GROUP-FORMATION-SUCCESS",
  P2pEventGroupFormationFailure => "P2P-GROUP-FORMATION-FAILURE",
  P2pEventGroupStarted => "P2P-GROUP-STARTED",
  P2pEventGroupRemoved => "P2P-GROUP-REMOVED",
  P2pEventCrossConnectEnable => "P2P-CROSS-CONNECT-ENABLE",
  P2pEventCrossConnectDisable => "P2P-CROSS-CONNECT-DISABLE",
  P2pEventProvDiscShowPin => "P2P-PROV-DISC-SHOW-PIN",
  P2pEventProvDiscEnterPin => "P2P-PROV-DISC-ENTER-PIN",
  P2pEventProvDiscPbcReq => "P2P-PROV-DISC-PBC-REQ",
  P2pEventProvDiscPbcResp => "P2P-PROV-DISC-PBC-RESP",
  P2pEventProvDiscFailure => "P2P-PROV-DISC-FAILURE",
  P2pEventServDiscReq => "P2P-SERV-DISC-REQ",
  P2pEventServDiscResp => "P2P-SERV-DISC-RESP",
  P2pEventServAspResp => "P2P-SERV-ASP-RESP",
  P2pEventInvitationReceived => "P2P-INVITATION-RECEIVED",
  P2pEventInvitationResult => "P2P-INVITATION-RESULT",
  P2pEventInvitationAccepted => "P2P-INVITATION-ACCEPTED",
  P2pEventFindStopped => "P2P-FIND-STOPPED",
  P2pEventPersistentPskFail => "P2P-PERSISTENT-PSK-FAIL",
  P2pEventPresenceResponse => "P2P-PRESENCE-RESPONSE",
  P2pEventNfcBothGo => "P2P-NFC-BOTH-GO",
  P2pEventNfcPeerClient => "P2P-NFC-PEER-CLIENT",
  P2pEventNfcWhileClient => "P2P-NFC-WHILE-CLIENT",
  P2pEventFallbackToGoNeg => "P2P-FALLBACK-TO-GO-NEG",
  P2pEventFallbackToGoNegEnabled => "P2P-FALLBACK-TO-GO-NEG-ENABLED",
  EssDisassocImminent => "ESS-DISASSOC-IMMINENT",
  P2pEventRemoveAndReformGroup => "P2P-REMOVE-AND-REFORM-GROUP",
  P2pEventP2psProvisionStart => "P2PS-PROV-START",
  P2pEventP2psProvisionDone => "P2PS-PROV-DONE",
  InterworkingAp => "INTERWORKING-AP",
  InterworkingExcluded => "INTERWORKING-BLACKLISTED",
  InterworkingNoMatch => "INTERWORKING-NO-MATCH",
  InterworkingAlreadyConnected => "INTERWORKING-ALREADY-CONNECTED",
  InterworkingSelected => "INTERWORKING-SELECTED",
  CredAdded => "CRED-ADDED",
  CredModified => "CRED-MODIFIED",
  CredRemoved => "CRED-REMOVED",
  GasResponseInfo => "GAS-RESPONSE-INFO",
  GasQueryStart => "GAS-QUERY-START",
  GasQueryDone => "GAS-QUERY-DONE",
  AnqpQueryDone => "ANQP-QUERY-DONE",
  RxAnqp => "RX-ANQP",
  RxHs20Anqp => "RX-HS20-ANQP",
  RxHs20AnqpIcon => "RX-HS20-ANQP-ICON",
  RxHs20Icon => "RX-HS20-ICON",
  RxMboAnqp => "RX-MBO-ANQP",
  RxVenueUrl => "RX-VENUE-URL",
  Hs20SubscriptionRemediation => "HS20-SUBSCRIPTION-REMEDIATION",
  Hs20DeauthImminentNotice => "HS20-DEAUTH-IMMINENT-NOTICE",
  Hs20TCAcceptance => "HS20-T-C-ACCEPTANCE",
  ExtRadioWorkStart => "EXT-RADIO-WORK-START",
  ExtRadioWorkTimeout => "EXT-RADIO-WORK-TIMEOUT",
  RrmEventNeighborRepRxed => "RRM-NEIGHBOR-REP-RECEIVED",
  RrmEventNeighborRepFailed => "RRM-NEIGHBOR-REP-REQUEST-FAILED",
  WpsEventPinNeeded => "WPS-PIN-NEEDED",
  WpsEventNewApSettings => "WPS-NEW-AP-SETTINGS",
  WpsEventRegSuccess => "WPS-REG-SUCCESS",
  WpsEventApSetupLocked => "WPS-AP-SETUP-LOCKED",
  WpsEventApSetupUnlocked => "WPS-AP-SETUP-UNLOCKED",
  WpsEventApPinEnabled => "WPS-AP-PIN-ENABLED",
  WpsEventApPinDisabled => "WPS-AP-PIN-DISABLED",
  WpsEventPinActive => "WPS-PIN-ACTIVE",
  WpsEventCancel => "WPS-CANCEL",
  ApStaConnected => "AP-STA-CONNECTED",
  ApStaDisconnected => "AP-STA-DISCONNECTED",
  ApStaPossiblePskMismatch => "AP-STA-POSSIBLE-PSK-MISMATCH",
  ApStaPollOk => "AP-STA-POLL-OK",
  ApRejectedMaxSta => "AP-REJECTED-MAX-STA",
  ApRejectedBlockedSta => "AP-REJECTED-BLOCKED-STA",
  Hs20TCFilteringAdd => "HS20-T-C-FILTERING-ADD",
  Hs20TCFilteringRemove => "HS20-T-C-FILTERING-REMOVE",
  ApEventEnabled => "AP-ENABLED",
  ApEventDisabled => "AP-DISABLED",
  InterfaceEnabled => "INTERFACE-ENABLED",
  InterfaceDisabled => "INTERFACE-DISABLED",
  AcsEventStarted => "ACS-STARTED",
  AcsEventCompleted => "ACS-COMPLETED",
  AcsEventFailed => "ACS-FAILED",
  DfsEventRadarDetected => "DFS-RADAR-DETECTED",
  DfsEventNewChannel => "DFS-NEW-CHANNEL",
  DfsEventCacStart => "DFS-CAC-START",
  DfsEventCacCompleted => "DFS-CAC-COMPLETED",
  DfsEventNopFinished => "DFS-NOP-FINISHED",
  DfsEventPreCacExpired => "DFS-PRE-CAC-EXPIRED",
  ApCsaFinished => "AP-CSA-FINISHED",
  P2pEventListenOffloadStop => "P2P-LISTEN-OFFLOAD-STOPPED",
  P2pListenOffloadStopReason => "P2P-LISTEN-OFFLOAD-STOP-REASON",
  BssTmResp => "BSS-TM-RESP",
  ColocIntfReq => "COLOC-INTF-REQ",
  ColocIntfReport => "COLOC-INTF-REPORT",
  MboCellPreference => "MBO-CELL-PREFERENCE",
  MboTransitionReason => "MBO-TRANSITION-REASON",
  BeaconReqTxStatus => "BEACON-REQ-TX-STATUS",
  BeaconRespRx => "BEACON-RESP-RX",
  PmksaCacheAdded => "PMKSA-CACHE-ADDED",
  PmksaCacheRemoved => "PMKSA-CACHE-REMOVED",
  FilsHlpRx => "FILS-HLP-RX",
  RxProbeRequest => "RX-PROBE-REQUEST",
  StaOpmodeMaxBwChanged => "STA-OPMODE-MAX-BW-CHANGED",
  StaOpmodeSmpsModeChanged => "STA-OPMODE-SMPS-MODE-CHANGED",
  StaOpmodeNSsChanged => "STA-OPMODE-N_SS-CHANGED",
  WdsStaInterfaceAdded => "WDS-STA-INTERFACE-ADDED",
  WdsStaInterfaceRemoved => "WDS-STA-INTERFACE-REMOVED",
  TransitionDisable => "TRANSITION-DISABLE",
  OcvFailure => "OCV-FAILURE",
  ApMgmtFrameReceived => "AP-MGMT-FRAME-RECEIVED",
}

impl Default for MessageKind {
  fn default() -> Self {
    MessageKind::Unknown
  }
}

fn known_table() -> &'static HashMap<&'static str, MessageKind> {
  static TABLE: OnceLock<HashMap<&'static str, MessageKind>> = OnceLock::new();
  TABLE.get_or_init(|| MessageKind::KNOWN.iter().copied().map(|(k, p)| (p, k)).collect())
}

impl MessageKind {
  /// Maps the on-wire kind token (the event line's first whitespace-delimited
  /// word, with no trailing space) to its `MessageKind`. Total: unrecognized
  /// tokens map to `Unknown`.
  ///
  /// `CTRL-REQ-*`/`CTRL-RSP-*` are matched by prefix rather than exact
  /// equality, because the remainder of the token (a field name and network
  /// id, e.g. `CTRL-REQ-PASSWORD-1:0`) is not itself enumerable.
  pub fn lookup(kind_token: &str) -> MessageKind {
    if let Some(&kind) = known_table().get(kind_token) {
      return kind;
    }
    if kind_token.starts_with("CTRL-REQ-") {
      return MessageKind::WpaCtrlReq;
    }
    if kind_token.starts_with("CTRL-RSP-") {
      return MessageKind::WpaCtrlRsp;
    }
    MessageKind::Unknown
  }

  /// The canonical on-wire prefix for this kind, if it has one fixed
  /// exact-match prefix. `Unknown`, `WpaCtrlReq` and `WpaCtrlRsp` return
  /// `None`: the first has no fixed prefix at all, the latter two are
  /// matched by prefix rather than by a single fixed token.
  pub fn wire_prefix(&self) -> Option<&'static str> {
    Self::KNOWN.iter().find(|(k, _)| k == self).map(|(_, p)| *p)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  #[test]
  fn unknown_is_total_fallback() {
    assert_eq!(MessageKind::lookup("CTRL-EVENT-NOVEL-THING"), MessageKind::Unknown);
    assert_eq!(MessageKind::lookup(""), MessageKind::Unknown);
  }

  #[test_case("CTRL-EVENT-CONNECTED", MessageKind::WpaEventConnected)]
  #[test_case("P2P-DEVICE-FOUND", MessageKind::P2pEventDeviceFound)]
  #[test_case("WPS-SUCCESS", MessageKind::WpsEventSuccess)]
  #[test_case("DPP-AUTH-SUCCESS", MessageKind::DppEventAuthSuccess)]
  fn known_prefixes_map_exactly(prefix: &str, expected: MessageKind) {
    assert_eq!(MessageKind::lookup(prefix), expected);
  }

  #[test]
  fn ctrl_req_and_rsp_matched_by_prefix_not_equality() {
    assert_eq!(MessageKind::lookup("CTRL-REQ-PASSWORD-1:0"), MessageKind::WpaCtrlReq);
    assert_eq!(MessageKind::lookup("CTRL-RSP-PIN-2:1"), MessageKind::WpaCtrlRsp);
    // A bare "CTRL-REQ-" with nothing following is still a request.
    assert_eq!(MessageKind::lookup("CTRL-REQ-"), MessageKind::WpaCtrlReq);
  }

  #[test]
  fn every_known_kind_round_trips_through_its_own_prefix() {
    for &(kind, prefix) in MessageKind::KNOWN {
      assert_eq!(MessageKind::lookup(prefix), kind, "prefix {prefix} did not map back to {kind:?}");
    }
  }

  #[test]
  fn table_has_no_duplicate_prefixes() {
    let mut seen = std::collections::HashSet::new();
    for &(_, prefix) in MessageKind::KNOWN {
      assert!(seen.insert(prefix), "duplicate prefix {prefix}");
    }
  }
}
