// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::document_type::DocumentType;

pub const REBUT_PROMPT: &str = concat!(
    "ROLE: Expert transcription for French 'Formulaire de déclaration Rebuts'.\n",
    "GOAL: Output ONLY valid JSON with keys: document_type, header, items, notes.\n",
    "RULES: Never invent text; blank/illegible => null. Do NOT autofill total_scrapped.\n",
    "One JSON row per physical handwritten table row; skip fully blank lines; keep order.\n",
    "HEADER constraint: 'equipe' MUST be a Roman numeral (I..X). If an Arabic digit 1-10 is written convert it to Roman. ",
    "Any other letters (Team A, QA, L, 2A ...) -> null. 'uap' digits only, 1 to 3 digits.\n",
    "SCHEMA:{\n",
    "  \"document_type\": \"Rebut\",\n",
    "  \"header\": {\"uap\":null,\"ligne\":null,\"of_number\":null,\"mat_number\":null,\"equipe\":null,\"date\":null,\"visa\":null},\n",
    "  \"items\": [{\"reference\":null,\"reference_fjk\":null,\"designation\":null,\"quantity\":null,\"unit\":null,\"type\":null,\"total_scrapped\":null}],\n",
    "  \"notes\": []}\n",
    "Return ONLY that JSON object."
);

pub const KOSU_PROMPT: &str = concat!(
    "ROLE: Expert form transcription specialist for French 'Suivi Productivité - Règles Escalade' forms.\n",
    "MISSION: Extract EXACTLY what is handwritten in EACH field, located by its printed label. No interpretation, no copying between fields.\n",
    "SCHEMA: {\n",
    "  \"document_type\": \"Kosu\",\n",
    "  \"Titre du document\": null,\n",
    "  \"Référence du document\": null,\n",
    "  \"Date du document\": null,\n",
    "  \"Equipe\": null,\n",
    "  \"Nom Ligne\": null,\n",
    "  \"Code ligne\": null,\n",
    "  \"Jour\": null,\n",
    "  \"Semaine\": null,\n",
    "  \"Numéro OF\": null,\n",
    "  \"Ref PF\": null,\n",
    "  \"Suivi horaire\": [ { \"Heure\": null, \"Nombre d'Opérateurs\": null, \"Objectif Qté / H\": null, \"Quantité pièces bonnes\": null, \"Productivité\": null } ],\n",
    "  \"Total / Equipe\": { \"Heures Dépensées\": null, \"Objectif Qté / EQ\": null, \"Qté pièces Bonnes / EQ\": null, \"Productivité / EQ\": null },\n",
    "  \"Règles d'escalade\": [ { \"Productivité\": null, \"Personne à informer\": null } ],\n",
    "  \"remark\": null\n",
    "}\n",
    "RULES:\n",
    "1. 'Nom Ligne' is descriptive text (e.g. 'A41S', 'Montage'); 'Code ligne' is digits only (e.g. '7', '564').\n",
    "2. They are two different boxes and never hold the same value. Letters found in 'Code ligne' are dropped; no digits -> null.\n",
    "3. Empty or illegible -> null. Never guess or copy from another field.\n",
    "Return ONLY the JSON object."
);

pub const NPT_PROMPT: &str = concat!(
    "Extract the NPT (downtime) form -> JSON only: {\"document_type\":\"NPT\",\"header\":{\"uap\":null,\"date\":null,\"equipe\":null},",
    "\"downtime_events\":[{\"codes_ligne\":null,\"ref_pf\":null,\"designation\":null,\"mod_impacte\":null,\"npt_minutes\":null,",
    "\"heure_debut_d_arret\":null,\"heure_fin_d_arret\":null,\"cause_npt\":null,\"numero_di\":null,\"commentaire\":null,\"validation\":null}]}.\n",
    "One object per handwritten row; blank -> null. 'uap' digits only (strip 'UAP', keep 1-3 digits; letters or punctuation like '0.4' -> null). ",
    "'equipe' Roman numeral I..X (convert a digit 1-10 to Roman; anything else -> null)."
);

pub const DEFAUTS_PRIMARY_PROMPT: &str = concat!(
    "ROLE: Transcribe ONLY handwritten info from 'FORMULAIRE ENREGISTREMENT QUALITE (Défauts POSTE)'. ",
    "OUTPUT: exactly one JSON object, no commentary. Blank or illegible => null. DO NOT GUESS.\n",
    "SCHEMA:{\n",
    "  \"document_type\":\"Défauts\",\n",
    "  \"entry_header\":{\"uap\":null,\"ligne\":null,\"n_poste\":null,\"operation\":null,\"code_famillier\":null,\"semaine\":null,\"annee\":null,\"mois\":null},\n",
    "  \"recorded_defects\":[{\"code\":null,\"day\":null,\"station\":null,\"raw_mark\":null}],\n",
    "  \"notes\":[]}\n",
    "RULES:\n",
    "- Only create a recorded_defects entry when a cell holds a CLEAR handwritten mark.\n",
    "- day ENUM [Lun,Mar,Mer,Jeu,Ven,Sam]; unsure -> null.\n",
    "- station ENUM [E1,E2,E3]; unsure -> null.\n",
    "- code: copy the handwritten code (letters/numbers/dash) else null.\n",
    "- raw_mark: keep the raw symbol ('X','XX','2X','3','✔'), do NOT aggregate.\n",
    "- Never fabricate rows to complete a pattern. Ignore printed template artifacts and faint shadows."
);

pub const DEFAUTS_VERIFY_PROMPT: &str = concat!(
    "You will verify defect marks. For each entry decide whether raw_mark is a real handwritten mark. ",
    "Ambiguous or artifact -> false. Return JSON {\"verified\":[{\"index\":i,\"keep\":true|false}]}."
);

pub const DEFAUTS_RECOVERY_PROMPT: &str = concat!(
    "Find additional handwritten defect marks (code/day/station) NOT in the provided list. ",
    "Return JSON {\"additional\":[{\"code\":null,\"day\":null,\"station\":null,\"raw_mark\":null}]}. ",
    "Only real marks; blank cells -> none."
);

/// 置信度重试时追加到提示词末尾
pub const CONFIDENCE_SUFFIX: &str = "\n\nALSO: Add an 'extraction_confidence' field (0-100) indicating how confident you are about the extracted values.";

/// 文档类型对应的主提取提示词
pub fn primary_prompt(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Rebut => REBUT_PROMPT,
        DocumentType::Npt => NPT_PROMPT,
        DocumentType::Kosu => KOSU_PROMPT,
        DocumentType::Defauts => DEFAUTS_PRIMARY_PROMPT,
    }
}
