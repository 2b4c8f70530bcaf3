#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Two-vuln checklist in the viewer's CKL shape. V-1001 carries a multi-line
/// finding detail so newline policy differences are visible downstream.
pub const SAMPLE_CKL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!--DISA STIG Viewer :: 2.16-->
<CHECKLIST>
  <ASSET>
    <ROLE>None</ROLE>
    <HOST_NAME>web01</HOST_NAME>
    <HOST_IP>10.0.0.5</HOST_IP>
  </ASSET>
  <STIGS>
    <iSTIG>
      <VULN>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Vuln_Num</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>V-1001</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Severity</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>high</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Group_Title</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>SRG-OS-000001</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_ID</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>SV-1001r1_rule</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_Ver</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>OS-01-000100</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_Title</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>Sessions must lock after inactivity</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Fix_Text</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>Configure the lock timeout.</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STATUS>Open</STATUS>
        <FINDING_DETAILS>first line
second line</FINDING_DETAILS>
        <COMMENTS>reviewed</COMMENTS>
      </VULN>
      <VULN>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Vuln_Num</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>V-1002</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Severity</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>medium</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Group_Title</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>SRG-OS-000002</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_ID</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>SV-1002r1_rule</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_Ver</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>OS-01-000200</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Rule_Title</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>Audit logging must be enabled</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STIG_DATA>
          <VULN_ATTRIBUTE>Fix_Text</VULN_ATTRIBUTE>
          <ATTRIBUTE_DATA>Enable the audit service.</ATTRIBUTE_DATA>
        </STIG_DATA>
        <STATUS>NotAFinding</STATUS>
        <FINDING_DETAILS></FINDING_DETAILS>
        <COMMENTS/>
      </VULN>
    </iSTIG>
  </STIGS>
</CHECKLIST>
"#;

/// Catalog-shaped finding feed for the Markdown report renderer.
pub const SAMPLE_CATALOG: &str = r#"{
  "stig": {
    "title": "Example Operating System STIG",
    "date": "2024-01-01",
    "description": "Requirements for the example OS.",
    "findings": {
      "V-1001": {
        "title": "Sessions must lock after inactivity",
        "severity": "high",
        "id": "V-1001",
        "ruleID": "SV-1001r1_rule",
        "description": "Unattended sessions expose data.",
        "checktext": "Verify the lock timeout.",
        "checkid": "C-1001",
        "fixtext": "Configure the lock timeout.",
        "fixid": "F-1001"
      },
      "V-1002": {
        "title": "Audit logging must be enabled",
        "severity": "medium",
        "id": "V-1002",
        "ruleID": "SV-1002r1_rule",
        "description": "Without auditing, events go unnoticed.",
        "checktext": "Verify auditd is running.",
        "checkid": "C-1002",
        "fixtext": "Enable the audit service.",
        "fixid": "F-1002"
      }
    }
  }
}
"#;

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("writing test fixture");
    path
}
