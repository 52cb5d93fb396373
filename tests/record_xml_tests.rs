//! Record XML rendering: element order, recipient variants and the
//! validation gate.

#![cfg(feature = "core")]

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal_macros::dec;
use verifactu::config::{Environment, Settings};
use verifactu::xml::{EnvelopeBuilder, RecordKind, RecordXmlBuilder};
use verifactu::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-01T19:20:30+01:00").unwrap()
}

fn issuer() -> LegalEntity {
    LegalEntity::new("Issuer SL", "89890001K")
}

fn standard() -> SubmissionBuilder {
    SubmissionBuilder::new(issuer(), "12345678/G33", date(2024, 1, 1), InvoiceType::Standard)
        .description("Test")
        .amounts(Amounts::new(dec!(21), dec!(100), dec!(21), dec!(121)))
        .generated_at(ts())
}

fn render(record: &InvoiceRecord) -> String {
    RecordXmlBuilder::new(&Settings::default())
        .build(record)
        .unwrap()
        .xml()
        .to_string()
}

// --- Domestic ---

#[test]
fn standard_domestic_record() {
    let record: InvoiceRecord = standard()
        .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
        .qualification(OperationQualification::SubjectDirect)
        .build()
        .unwrap()
        .into();

    let doc = RecordXmlBuilder::new(&Settings::default()).build(&record).unwrap();
    assert_eq!(doc.kind(), RecordKind::Submission);
    assert_eq!(doc.hash(), "6230953E0F5A4A97EFFB78D893FFF87134716F1B5B1941B3B0325FC3D07D9C26");
    assert_eq!(doc.timestamp(), "2024-01-01T19:20:30+01:00");
    assert_eq!(record.header().sealed_hash(), Some(doc.hash()));

    insta::assert_snapshot!(doc.xml().replace("><", ">\n<"), @r#"
    <sf:RegistroAlta xmlns:sf="https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd">
    <sf:IDVersion>1.0</sf:IDVersion>
    <sf:IDFactura>
    <sf:IDEmisorFactura>89890001K</sf:IDEmisorFactura>
    <sf:NumSerieFactura>12345678/G33</sf:NumSerieFactura>
    <sf:FechaExpedicionFactura>01-01-2024</sf:FechaExpedicionFactura>
    </sf:IDFactura>
    <sf:NombreRazonEmisor>Issuer SL</sf:NombreRazonEmisor>
    <sf:TipoFactura>F1</sf:TipoFactura>
    <sf:DescripcionOperacion>Test</sf:DescripcionOperacion>
    <sf:FacturaSinIdentifDestinatarioArt61d>N</sf:FacturaSinIdentifDestinatarioArt61d>
    <sf:Destinatarios>
    <sf:IDDestinatario>
    <sf:NombreRazon>Client SA</sf:NombreRazon>
    <sf:NIF>B12345678</sf:NIF>
    </sf:IDDestinatario>
    </sf:Destinatarios>
    <sf:Desglose>
    <sf:DetalleDesglose>
    <sf:Impuesto>01</sf:Impuesto>
    <sf:ClaveRegimen>01</sf:ClaveRegimen>
    <sf:CalificacionOperacion>S1</sf:CalificacionOperacion>
    <sf:TipoImpositivo>21.00</sf:TipoImpositivo>
    <sf:BaseImponibleOimporteNoSujeto>100.00</sf:BaseImponibleOimporteNoSujeto>
    <sf:CuotaRepercutida>21.00</sf:CuotaRepercutida>
    </sf:DetalleDesglose>
    </sf:Desglose>
    <sf:CuotaTotal>21.00</sf:CuotaTotal>
    <sf:ImporteTotal>121.00</sf:ImporteTotal>
    <sf:Encadenamiento>
    <sf:PrimerRegistro>S</sf:PrimerRegistro>
    </sf:Encadenamiento>
    <sf:SistemaInformatico>
    <sf:NombreRazon>Software Provider Ltd</sf:NombreRazon>
    <sf:NIF>12312367X</sf:NIF>
    <sf:NombreSistemaInformatico>Invoicing Software</sf:NombreSistemaInformatico>
    <sf:IdSistemaInformatico>01</sf:IdSistemaInformatico>
    <sf:Version>0.1.0</sf:Version>
    <sf:NumeroInstalacion>1</sf:NumeroInstalacion>
    <sf:TipoUsoPosibleSoloVerifactu>S</sf:TipoUsoPosibleSoloVerifactu>
    <sf:TipoUsoPosibleMultiOT>S</sf:TipoUsoPosibleMultiOT>
    <sf:IndicadorMultiplesOT>S</sf:IndicadorMultiplesOT>
    </sf:SistemaInformatico>
    <sf:FechaHoraHusoGenRegistro>2024-01-01T19:20:30+01:00</sf:FechaHoraHusoGenRegistro>
    <sf:TipoHuella>01</sf:TipoHuella>
    <sf:Huella>6230953E0F5A4A97EFFB78D893FFF87134716F1B5B1941B3B0325FC3D07D9C26</sf:Huella>
    </sf:RegistroAlta>
    "#);
}

#[test]
fn chained_record_renders_previous() {
    let prev = PreviousRecord::new("12345677/G32", date(2023, 12, 31), "ABCDEF").unwrap();
    let record: InvoiceRecord = standard()
        .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
        .qualification(OperationQualification::SubjectDirect)
        .external_reference("ERP-42")
        .previous(prev)
        .build()
        .unwrap()
        .into();
    let xml = render(&record);
    assert!(xml.contains(
        "<sf:Encadenamiento><sf:RegistroAnterior><sf:IDEmisorFactura>89890001K</sf:IDEmisorFactura>\
         <sf:NumSerieFactura>12345677/G32</sf:NumSerieFactura>\
         <sf:FechaExpedicionFactura>31-12-2023</sf:FechaExpedicionFactura>\
         <sf:Huella>ABCDEF</sf:Huella></sf:RegistroAnterior></sf:Encadenamiento>"
    ));
    assert!(!xml.contains("PrimerRegistro"));
    assert!(xml.contains("</sf:IDFactura><sf:RefExterna>ERP-42</sf:RefExterna><sf:NombreRazonEmisor>"));
}

// --- Foreign recipients ---

#[test]
fn eu_recipient_reverse_charge_gets_country_prefix() {
    let recipient = Recipient::new("Client SARL", "12345678901", "fr", IdType::TaxId).unwrap();
    let record: InvoiceRecord = standard()
        .recipient(recipient)
        .qualification(OperationQualification::SubjectReverseCharge)
        .build()
        .unwrap()
        .into();
    let xml = render(&record);
    assert!(xml.contains(
        "<sf:IDOtro><sf:CodigoPais>FR</sf:CodigoPais><sf:IDType>02</sf:IDType><sf:ID>FR12345678901</sf:ID></sf:IDOtro>"
    ));
    assert!(xml.contains("<sf:CalificacionOperacion>S2</sf:CalificacionOperacion>"));
    assert!(!xml.contains("<sf:NIF>12345678901</sf:NIF>"));
}

#[test]
fn non_eu_recipient_keeps_bare_id() {
    let recipient = Recipient::new("Acme Inc.", "P1234567", "US", IdType::Passport).unwrap();
    let record: InvoiceRecord = standard()
        .recipient(recipient)
        .qualification(OperationQualification::SubjectReverseCharge)
        .build()
        .unwrap()
        .into();
    let xml = render(&record);
    assert!(xml.contains("<sf:CodigoPais>US</sf:CodigoPais><sf:IDType>03</sf:IDType><sf:ID>P1234567</sf:ID>"));
}

#[test]
fn eu_recipient_without_id_is_rejected() {
    let err = Recipient::new("Kunde AG", "", "DE", IdType::TaxId).unwrap_err();
    assert!(matches!(err, VerifactuError::Recipient(ref m) if m.contains("DE")));
}

#[test]
fn foreign_recipient_and_foreign_provider() {
    let provider = LegalEntity::foreign("Softhaus GmbH", "DE123456789", "DE", IdType::TaxId);
    let settings = Settings::new(
        SoftwareInfo::new(provider, "Kasse", "K1", "2.4.0", 7),
        Environment::Sandbox,
    );
    let record: InvoiceRecord = standard()
        .recipient(Recipient::new("Kunde AG", "123456789", "DE", IdType::TaxId).unwrap())
        .qualification(OperationQualification::SubjectReverseCharge)
        .build()
        .unwrap()
        .into();
    let xml = RecordXmlBuilder::new(&settings).build(&record).unwrap().xml().to_string();

    let start = xml.find("<sf:SistemaInformatico>").unwrap();
    let end = xml.find("</sf:SistemaInformatico>").unwrap();
    let system = &xml[start..end];
    assert!(system.contains(
        "<sf:NombreRazon>Softhaus GmbH</sf:NombreRazon><sf:IDOtro><sf:CodigoPais>DE</sf:CodigoPais>\
         <sf:IDType>02</sf:IDType><sf:ID>DE123456789</sf:ID></sf:IDOtro>"
    ));
    assert!(!system.contains("sf:NIF"));
    assert!(system.contains("<sf:NombreSistemaInformatico>Kasse</sf:NombreSistemaInformatico>"));
    assert!(system.contains("<sf:NumeroInstalacion>7</sf:NumeroInstalacion>"));

    let recipients = &xml[xml.find("<sf:Destinatarios>").unwrap()..xml.find("</sf:Destinatarios>").unwrap()];
    assert!(recipients.contains("<sf:IDOtro><sf:CodigoPais>DE</sf:CodigoPais>"));
    assert!(!recipients.contains("sf:NIF"));
}

// --- Simplified ---

#[test]
fn simplified_rectification_has_no_recipient() {
    let record: InvoiceRecord =
        SubmissionBuilder::new(issuer(), "TR-1", date(2024, 1, 5), InvoiceType::RectificationSimplified)
            .description("Ticket refund")
            .amounts(Amounts::new(dec!(10), dec!(-10), dec!(-1), dec!(-11)))
            .qualification(OperationQualification::SubjectDirect)
            .rectifies(Rectification::new("T-1", date(2024, 1, 1), true))
            .generated_at(ts())
            .build()
            .unwrap()
            .into();
    let xml = render(&record);
    assert!(xml.contains("<sf:TipoFactura>R5</sf:TipoFactura><sf:TipoRectificativa>I</sf:TipoRectificativa>"));
    assert!(xml.contains(
        "<sf:FacturasRectificadas><sf:IDFacturaRectificada><sf:IDEmisorFactura>89890001K</sf:IDEmisorFactura>\
         <sf:NumSerieFactura>T-1</sf:NumSerieFactura><sf:FechaExpedicionFactura>01-01-2024</sf:FechaExpedicionFactura>\
         </sf:IDFacturaRectificada></sf:FacturasRectificadas>"
    ));
    assert!(xml.contains("<sf:FacturaSinIdentifDestinatarioArt61d>S</sf:FacturaSinIdentifDestinatarioArt61d>"));
    assert!(!xml.contains("sf:Destinatarios"));
    assert!(!xml.contains("sf:ImporteRectificacion"));
}

#[test]
fn simplified_invoice_has_no_recipient_and_defaults_to_s1() {
    let record: InvoiceRecord =
        SubmissionBuilder::new(issuer(), "T-1", date(2024, 1, 1), InvoiceType::Simplified)
            .description("Ticket")
            .amounts(Amounts::new(dec!(10), dec!(10), dec!(1), dec!(11)))
            .generated_at(ts())
            .build()
            .unwrap()
            .into();
    let xml = render(&record);
    assert!(xml.contains("<sf:TipoFactura>F2</sf:TipoFactura>"));
    assert!(xml.contains("<sf:FacturaSinIdentifDestinatarioArt61d>S</sf:FacturaSinIdentifDestinatarioArt61d>"));
    assert!(!xml.contains("sf:Destinatarios"));
    assert!(xml.contains("<sf:CalificacionOperacion>S1</sf:CalificacionOperacion>"));
}

// --- Validation gate ---

#[test]
fn all_failures_reported_together_and_record_stays_unsealed() {
    let record: InvoiceRecord =
        SubmissionBuilder::new(issuer(), "A-1", date(2024, 1, 1), InvoiceType::Standard)
            .amounts(Amounts::new(dec!(21), dec!(100), dec!(21), dec!(121)))
            .generated_at(ts())
            .build()
            .unwrap()
            .into();

    let err = RecordXmlBuilder::new(&Settings::default())
        .build(&record)
        .unwrap_err();
    let VerifactuError::Validation(errors) = err else {
        panic!("expected validation errors, got {err}");
    };
    assert!(errors.len() >= 3, "{errors:?}");
    assert!(errors.iter().any(|e| e.field.contains("recipient")));
    assert!(errors.iter().any(|e| e.field.contains("description")));
    assert!(!record.is_sealed());
}

#[test]
fn overlong_number_is_a_validation_error() {
    let record: InvoiceRecord = standard()
        .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
        .qualification(OperationQualification::SubjectDirect)
        .build()
        .unwrap()
        .into();
    assert!(RecordXmlBuilder::new(&Settings::default()).build(&record).is_ok());

    let record: InvoiceRecord =
        SubmissionBuilder::new(issuer(), "X".repeat(61), date(2024, 1, 1), InvoiceType::Standard)
            .description("Test")
            .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
            .qualification(OperationQualification::SubjectDirect)
            .generated_at(ts())
            .build()
            .unwrap()
            .into();
    let err = RecordXmlBuilder::new(&Settings::default())
        .build(&record)
        .unwrap_err();
    let VerifactuError::Validation(errors) = err else {
        panic!("expected validation errors, got {err}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "number");
}

// --- Cancellation ---

#[test]
fn cancellation_record() {
    let prev = PreviousRecord::new("A-2", date(2024, 1, 2), "FFFF").unwrap();
    let cancellation = CancellationBuilder::new(issuer(), "A-1", date(2024, 1, 1))
        .previous(prev)
        .generated_at(ts())
        .external_reference("CANCEL-1")
        .generator(Generator::new(GeneratorType::Issuer, issuer()))
        .build();
    let record = InvoiceRecord::from(cancellation);

    let doc = RecordXmlBuilder::new(&Settings::default()).build(&record).unwrap();
    assert_eq!(doc.kind(), RecordKind::Cancellation);
    let xml = doc.xml();
    assert!(xml.starts_with("<sf:RegistroAnulacion xmlns:sf="));
    assert!(xml.contains("<sf:IDEmisorFacturaAnulada>89890001K</sf:IDEmisorFacturaAnulada>"));
    assert!(xml.contains("<sf:RefExterna>CANCEL-1</sf:RefExterna><sf:GeneradoPor>E</sf:GeneradoPor>"));
    assert!(xml.contains("<sf:Generador><sf:NombreRazon>Issuer SL</sf:NombreRazon><sf:NIF>89890001K</sf:NIF></sf:Generador>"));
    assert!(!xml.contains("NombreRazonEmisor"));
    assert!(xml.ends_with(&format!("<sf:Huella>{}</sf:Huella></sf:RegistroAnulacion>", doc.hash())));
}

// --- Envelope ---

#[cfg(feature = "sign")]
#[test]
fn envelope_carries_issuer_header() {
    use verifactu::sign::{CertificateBundle, XmlSigner};

    let bundle = CertificateBundle::from_pem(
        include_str!("fixtures/signer.crt.pem"),
        include_str!("fixtures/signer.key.pem"),
    )
    .unwrap();
    let signer = XmlSigner::new(&bundle).unwrap();
    let record: InvoiceRecord = standard()
        .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
        .qualification(OperationQualification::SubjectDirect)
        .build()
        .unwrap()
        .into();
    let doc = RecordXmlBuilder::new(&Settings::default()).build(&record).unwrap();
    let signed = signer.sign(doc).unwrap();
    let envelope = EnvelopeBuilder::wrap(&signed).unwrap();

    let xml = envelope.xml();
    assert!(xml.starts_with("<sfLR:RegFactuSistemaFacturacion xmlns:ds="));
    assert!(xml.contains("<sfLR:Cabecera><sf:ObligadoEmision><sf:NombreRazon>Issuer SL</sf:NombreRazon><sf:NIF>89890001K</sf:NIF></sf:ObligadoEmision></sfLR:Cabecera>"));
    assert!(xml.contains(&format!("<sfLR:RegistroFactura>{}</sfLR:RegistroFactura>", signed.xml())));
    assert!(!xml.starts_with("<?xml"));
    assert_eq!(envelope.hash(), signed.hash());
}
