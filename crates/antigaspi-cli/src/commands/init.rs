//! The `antigaspi init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create antigaspi.toml
    if std::path::Path::new("antigaspi.toml").exists() {
        println!("antigaspi.toml already exists, skipping.");
    } else {
        std::fs::write("antigaspi.toml", SAMPLE_CONFIG)?;
        println!("Created antigaspi.toml");
    }

    // Create example question bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.json");
    if example_path.exists() {
        println!("banks/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/example.json with your own questions");
    println!("  2. Run: antigaspi validate --bank banks/example.json");
    println!("  3. Run: antigaspi play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# antigaspi configuration

bank = "banks/example.json"
format = "text"
output_dir = "./antigaspi-results"

# Override the recap texts of the question bank:
# [copy]
# theme = "anti-gaspi"
# waste_reference = 30.0
# waste_unit = "kg"
#
# [copy.high]
# narrative = "Bravo !"
# tip = "Continuez ainsi."
"#;

const EXAMPLE_BANK: &str = r#"{
  "title": "Exemple anti-gaspi",
  "questions": [
    {
      "id": 1,
      "question": "Faites-vous une liste de courses avant d'aller au magasin ?",
      "type": "multiple_choice",
      "options": [
        { "text": "Toujours", "score": 1 },
        { "text": "Parfois", "score": 2 },
        { "text": "Jamais", "score": 4 }
      ]
    },
    {
      "id": 2,
      "question": "Combien de repas jetez-vous par semaine ?",
      "type": "numeric",
      "unit": "repas",
      "scoringRanges": [
        { "max": 0, "score": 1 },
        { "min": 0, "max": 2, "score": 2 },
        { "min": 2, "score": 4 },
        { "value": "Je ne sais pas", "score": 3 },
        { "defaultScore": 3 }
      ]
    }
  ]
}
"#;
