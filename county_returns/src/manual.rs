/*!

This is the long-form manual for `county_returns` and `countyret`.

## Input formats

The following providers are supported:
* `openelections` the precinct or county files of the OpenElections project (CSV)
* `official` the county exports of the state election returns site (CSV)
* `official_xlsx` the same exports, saved as an Excel spreadsheet

### `openelections`

One row per precinct (or county), office and candidate. The columns are found by
their name in the header; other columns (`district`, `precinct`, ...) are ignored.

```text
county,precinct,office,district,party,candidate,votes
Adams,Abbottstown,President,,DEM,Joseph R. Biden,213
Adams,Abbottstown,President,,REP,Donald J. Trump,412
```

### `official`

The official export has one row per county and candidate. The vote counts may use
thousands separators.

```text
County Name,Office Name,Party Name,Candidate Name,Votes
ADAMS,President of the United States,Democratic,"BIDEN, JOSEPH ROBINETTE","18,207"
```

### `official_xlsx`

The same columns as `official`, in the first worksheet of a spreadsheet (or in the
worksheet named by `excelWorksheetName`).

## Normalization

* counties: the ` County` suffix is removed and the name is title-cased
  (`McKEAN County` becomes `McKean`). When the dataset already stores a county,
  its spelling is reused.
* candidates: title case, initials followed by a period, suffixes (`Jr.`, `III`)
  fixed. For President and Governor only the first name of the ticket is kept
  (`Biden / Harris` becomes `Biden`).
* parties: mapped to short codes (`Democratic` becomes `DEM`). Unknown parties are
  uppercased. A row without a party takes the party of the same candidate in the
  other rows, or is counted with the other votes under `OTHER`.

## Competitiveness

The margin is `(dem - rep) / (dem + rep) * 100`: the other parties never count.
A margin exactly on a boundary belongs to the more competitive band.

| abs(margin) | band         |
|-------------|--------------|
| <= 0.5      | Tossup       |
| <= 1        | Tilt         |
| <= 5.5      | Lean         |
| <= 10       | Likely       |
| <= 20       | Safe         |
| <= 30       | Stronghold   |
| <= 40       | Dominant     |
| > 40        | Annihilation |

## Configuration

`countyret ingest` reads a configuration file in JSON:

```text
{
  "title": "Pennsylvania Election Results",
  "sources": [
    { "provider": "openelections", "filePath": "2020/20201103__pa__general__county.csv",
      "year": 2020, "offices": ["President", "U.S. Senate"] },
    { "provider": "official_xlsx", "filePath": "2024.xlsx", "year": 2024,
      "excelWorksheetName": "Sheet1" }
  ],
  "partyCodes": { "Keystone": "KEY" },
  "offices": [ { "name": "Governor", "category": "governor", "displayName": "Governor" } ],
  "surnames": ["DePasquale"],
  "nominees": [ { "year": 2024, "contest": "president", "party": "DEM", "name": "Kamala Harris" } ],
  "cohorts": [ { "name": "Coal country", "counties": ["Fayette", "Greene"] } ]
}
```

All the entries except `sources` are optional and extend the built-in tables. The
paths are relative to the directory of the configuration file. A missing source
file is reported and skipped.

## Output

The dataset is a single JSON document (see [`crate::dataset`]). It is written to a
temporary file first and then renamed, so that a failed run never leaves a
truncated dataset behind.

`countyret report` prints the statewide results, the biggest swings, the flipped
counties, the bellwethers and the latest standings of a contest, and can write the
same findings as HTML cards.

 */
